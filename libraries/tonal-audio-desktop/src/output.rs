/// CPAL-backed audio context (dedicated audio thread)
use crate::error::{AudioError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::thread::{self, JoinHandle};
use tonal_playback::{
    AudioContext, ContextError, ContextState, EngineContext, SharedRenderer,
};
use tracing::{debug, error, info, warn};

/// Commands sent to the audio thread
enum ContextCommand {
    /// Build the output stream around a renderer
    Attach {
        renderer: SharedRenderer,
        reply: Sender<Result<()>>,
    },
    /// Start pulling audio
    Resume(Sender<Result<()>>),
    /// Pause the stream
    Suspend(Sender<Result<()>>),
    /// Drop the stream and exit
    Close,
}

/// Audio context on the default output device
///
/// **Architecture**: a dedicated thread owns the device and the CPAL
/// `Stream`; this handle only talks to it over a channel, so it stays
/// `Send + Sync` on every platform.
pub struct CpalContext {
    command_tx: Sender<ContextCommand>,
    sample_rate: u32,
    channels: u16,
    state: Mutex<ContextState>,
    audio_thread: Mutex<Option<JoinHandle<()>>>,
}

impl CpalContext {
    /// Open the default output device
    ///
    /// The stream starts suspended; nothing is audible until `resume()`.
    ///
    /// # Errors
    /// Returns an error if no device is found or its configuration cannot
    /// be queried
    pub fn open() -> Result<Self> {
        let (command_tx, command_rx) = bounded::<ContextCommand>(32);
        let (ready_tx, ready_rx) = bounded::<Result<(u32, u16)>>(1);

        let audio_thread = thread::Builder::new()
            .name("tonal-audio".into())
            .spawn(move || Self::audio_thread_run(&ready_tx, &command_rx))
            .map_err(|e| AudioError::DeviceError(e.to_string()))?;

        let (sample_rate, channels) = ready_rx.recv().map_err(|_| AudioError::ThreadStopped)??;
        info!("Opened output device ({} Hz, {} channels)", sample_rate, channels);

        Ok(Self {
            command_tx,
            sample_rate,
            channels,
            state: Mutex::new(ContextState::Suspended),
            audio_thread: Mutex::new(Some(audio_thread)),
        })
    }

    fn open_default_device() -> Result<(Device, StreamConfig, u32, u16)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceNotFound)?;
        let supported = device.default_output_config()?;

        let sample_rate = supported.sample_rate();
        let channels = supported.channels();
        Ok((device, supported.config(), sample_rate, channels))
    }

    /// Audio thread main loop
    ///
    /// Owns the device and at most one stream; exits on `Close` or when
    /// the handle is dropped.
    fn audio_thread_run(
        ready_tx: &Sender<Result<(u32, u16)>>,
        command_rx: &Receiver<ContextCommand>,
    ) {
        let (device, config) = match Self::open_default_device() {
            Ok((device, config, sample_rate, channels)) => {
                let _ = ready_tx.send(Ok((sample_rate, channels)));
                (device, config)
            }
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };

        let mut stream: Option<Stream> = None;

        while let Ok(command) = command_rx.recv() {
            match command {
                ContextCommand::Attach { renderer, reply } => {
                    stream = None;
                    let result = Self::build_stream(&device, &config, renderer).map(|s| {
                        stream = Some(s);
                    });
                    let _ = reply.send(result);
                }
                ContextCommand::Resume(reply) => {
                    let result = match &stream {
                        Some(s) => s.play().map_err(AudioError::from),
                        None => Ok(()),
                    };
                    let _ = reply.send(result);
                }
                ContextCommand::Suspend(reply) => {
                    let result = match &stream {
                        Some(s) => s.pause().map_err(AudioError::from),
                        None => Ok(()),
                    };
                    let _ = reply.send(result);
                }
                ContextCommand::Close => break,
            }
        }

        drop(stream);
        debug!("Audio thread exiting");
    }

    fn build_stream(device: &Device, config: &StreamConfig, renderer: SharedRenderer) -> Result<Stream> {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                Self::audio_callback(data, &renderer);
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )?;

        // Some hosts start streams on creation
        if let Err(e) = stream.pause() {
            warn!("Could not pause new stream: {}", e);
        }
        Ok(stream)
    }

    /// Real-time callback; never waits on the control thread
    fn audio_callback(output: &mut [f32], renderer: &SharedRenderer) {
        match renderer.try_lock() {
            Ok(mut guard) => guard.render(output),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().render(output),
            Err(TryLockError::WouldBlock) => output.fill(0.0),
        }
    }

    fn state_guard(&self) -> MutexGuard<'_, ContextState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Send a command and wait for the audio thread's reply
    fn request(&self, make: impl FnOnce(Sender<Result<()>>) -> ContextCommand) -> Result<()> {
        let (reply_tx, reply_rx) = bounded(1);
        self.command_tx
            .send(make(reply_tx))
            .map_err(|_| AudioError::ThreadStopped)?;
        reply_rx.recv().map_err(|_| AudioError::ThreadStopped)?
    }
}

impl AudioContext for CpalContext {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn state(&self) -> ContextState {
        *self.state_guard()
    }

    fn attach(&self, renderer: SharedRenderer) -> std::result::Result<(), ContextError> {
        if self.state() == ContextState::Closed {
            return Err(ContextError::Closed);
        }
        self.request(|reply| ContextCommand::Attach { renderer, reply })?;
        *self.state_guard() = ContextState::Suspended;
        Ok(())
    }

    fn resume(&self) -> std::result::Result<(), ContextError> {
        if self.state() == ContextState::Closed {
            return Err(ContextError::Closed);
        }
        self.request(ContextCommand::Resume)?;
        *self.state_guard() = ContextState::Running;
        Ok(())
    }

    fn suspend(&self) -> std::result::Result<(), ContextError> {
        if self.state() == ContextState::Closed {
            return Err(ContextError::Closed);
        }
        self.request(ContextCommand::Suspend)?;
        *self.state_guard() = ContextState::Suspended;
        Ok(())
    }

    fn close(&self) {
        {
            let mut state = self.state_guard();
            if *state == ContextState::Closed {
                return;
            }
            *state = ContextState::Closed;
        }

        let _ = self.command_tx.send(ContextCommand::Close);
        let handle = match self.audio_thread.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Audio thread panicked");
            }
        }
        info!("Output device closed");
    }
}

impl Drop for CpalContext {
    fn drop(&mut self) {
        self.close();
    }
}

/// Engine context that opens the default device on first use
pub fn engine() -> EngineContext {
    EngineContext::lazy(|| {
        let context = CpalContext::open()?;
        Ok(Arc::new(context) as Arc<dyn AudioContext>)
    })
}
