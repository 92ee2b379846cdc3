use std::sync::mpsc::{self, Receiver, SendError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use chip8vm::{
    Audio, CpuSnapshot, Frame, KeyInput, KeyReceiver, KeySender, Platform, Render, DISPLAY_HEIGHT,
    DISPLAY_WIDTH,
};
use sdl2::{audio::AudioSpecDesired, pixels::Color, rect::Rect};
use thiserror::Error;

use super::{
    beep::{BeepRequest, BeepSender, SquareWave},
    keymap::{Action, Keymap},
};

const FRAME_DELAY: Duration = Duration::from_micros(1_000_000 / chip8vm::cpu::TIMER_HZ as u64);
const TITLE: &str = "chip8vm";

type Machine = Platform<KeyReceiver, BeepSender>;

#[derive(Error, Debug)]
enum AppError {
    #[error("SDL error: {0}")]
    Sdl(String),
}

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Sdl(s)
    }
}

pub struct Settings {
    pub cycles_per_frame: u32,
    pub scale: u32,
}

/// Sent from the window to the machine thread. The window cancels a pending
/// wait for a key before sending a pause or reset, so a blocked machine
/// gets to read it.
enum Command {
    TogglePause,
    Reset,
    Quit,
}

/// Sent from the machine thread to the window
enum Report {
    Frame(Box<Frame>, CpuSnapshot),
    Halted(chip8vm::Error),
}

struct FrameSender<'a>(&'a Sender<Report>);

impl Render for FrameSender<'_> {
    type Error = SendError<Report>;

    fn render(&mut self, frame: &Frame, cpu: &CpuSnapshot) -> Result<(), Self::Error> {
        self.0.send(Report::Frame(Box::new(*frame), *cpu))
    }
}

/// Runs the machine at 60 frames per second until told to quit or until the
/// window goes away. A wait for a key press blocks this thread only.
fn machine_loop<K: KeyInput, A: Audio>(
    mut machine: Platform<K, A>,
    cycles_per_frame: u32,
    commands: Receiver<Command>,
    reports: Sender<Report>,
) {
    let mut paused = false;

    loop {
        let started = Instant::now();

        loop {
            match commands.try_recv() {
                Ok(Command::TogglePause) => {
                    paused = !paused;
                    if !paused {
                        machine.resume();
                    }
                }
                Ok(Command::Reset) => {
                    machine.reset();
                    paused = false;
                }
                Ok(Command::Quit) | Err(TryRecvError::Disconnected) => return,
                Err(TryRecvError::Empty) => break,
            }
        }

        if !paused && !machine.is_halted() {
            for _ in 0..cycles_per_frame {
                match machine.tick_instruction() {
                    Ok(()) => {}
                    // interrupted by the window, resumed or reset later
                    Err(chip8vm::Error::Cancelled) => break,
                    Err(err) => {
                        if reports.send(Report::Halted(err)).is_err() {
                            return;
                        }
                        break;
                    }
                }
            }
            machine.tick_timer();
        }

        if machine.present(&mut FrameSender(&reports)).is_err() {
            return;
        }

        if let Some(rest) = FRAME_DELAY.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
}

/// Main application loop
pub fn run(
    machine: Machine,
    keys: KeySender,
    beeps: Receiver<BeepRequest>,
    settings: Settings,
) -> Result<(), anyhow::Error> {
    // initialize SDL context and subsystems
    let sdl_context = sdl2::init()
        .map_err(AppError::from)
        .context("failed to initialize SDL context")?;
    let sdl_video = sdl_context
        .video()
        .map_err(AppError::from)
        .context("failed to initialize video subsystem")?;
    let sdl_audio = sdl_context
        .audio()
        .map_err(AppError::from)
        .context("failed to initialize audio subsystem")?;

    // build the window
    let scale = settings.scale.max(1);
    let window = sdl_video
        .window(
            TITLE,
            DISPLAY_WIDTH as u32 * scale,
            DISPLAY_HEIGHT as u32 * scale,
        )
        .position_centered()
        .build()
        .context("error creating window")?;

    // get the drawing canvas
    let mut canvas = window
        .into_canvas()
        .build()
        .context("error creating window canvas")?;

    // get the event pump
    let mut event_pump = sdl_context
        .event_pump()
        .map_err(AppError::from)
        .context("error obtaining the event pump")?;

    // desired audio spec
    let desired_spec = AudioSpecDesired {
        freq: Some(44100),
        channels: Some(1),
        samples: None,
    };

    // get sound device
    let mut audio_device = sdl_audio
        .open_playback(None, &desired_spec, SquareWave::from)
        .map_err(AppError::from)
        .context("error opening audio device")?;

    // start the machine on its own thread
    let cancel = machine.cancel_token();
    let (command_tx, command_rx) = mpsc::channel();
    let (report_tx, report_rx) = mpsc::channel();
    let cycles_per_frame = settings.cycles_per_frame;
    let worker = thread::Builder::new()
        .name("machine".into())
        .spawn(move || machine_loop(machine, cycles_per_frame, command_rx, report_tx))
        .context("error starting machine thread")?;

    let keymap = Keymap::Qwerty;
    let mut frame: Box<Frame> = Box::new([false; DISPLAY_WIDTH * DISPLAY_HEIGHT]);
    let mut snapshot: Option<CpuSnapshot> = None;
    let mut beep_until: Option<Instant> = None;
    let mut paused = false;

    'running: loop {
        // process input events
        for event in event_pump.poll_iter() {
            match keymap.translate_action(&event) {
                Some(Action::Press(key)) => keys.press(key),
                Some(Action::Release(key)) => keys.release(key),
                Some(Action::TogglePause) => {
                    paused = !paused;
                    let title = match (paused, snapshot) {
                        (true, Some(cpu)) => format!("{} (paused at {:#05X})", TITLE, cpu.pc),
                        (true, None) => format!("{} (paused)", TITLE),
                        (false, _) => TITLE.to_string(),
                    };
                    canvas
                        .window_mut()
                        .set_title(&title)
                        .context("error setting window title")?;
                    if paused {
                        cancel.cancel();
                    }
                    let _ = command_tx.send(Command::TogglePause);
                }
                Some(Action::Reset) => {
                    canvas
                        .window_mut()
                        .set_title(TITLE)
                        .context("error setting window title")?;
                    paused = false;
                    cancel.cancel();
                    let _ = command_tx.send(Command::Reset);
                }
                Some(Action::Quit) => break 'running,
                None => {}
            }
        }

        // collect what the machine did since the last pass
        loop {
            match report_rx.try_recv() {
                Ok(Report::Frame(latest, cpu)) => {
                    frame = latest;
                    snapshot = Some(cpu);
                }
                Ok(Report::Halted(err)) => {
                    log::error!("{}", err);
                    canvas
                        .window_mut()
                        .set_title(&format!("{} (halted, F5 to reset)", TITLE))
                        .context("error setting window title")?;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'running,
            }
        }

        // sound
        while let Ok(request) = beeps.try_recv() {
            audio_device.lock().set_frequency(request.frequency_hz);
            audio_device.resume();
            beep_until = Some(Instant::now() + request.duration);
        }
        if beep_until.map_or(false, |until| Instant::now() >= until) {
            audio_device.pause();
            beep_until = None;
        }

        // draw a frame
        canvas.set_draw_color(Color::RGB(0x00, 0x00, 0x00));
        canvas.clear();

        canvas.set_draw_color(Color::RGB(0xFF, 0xFF, 0xFF));
        for (index, _) in frame.iter().enumerate().filter(|(_, lit)| **lit) {
            let x = (index % DISPLAY_WIDTH) as u32;
            let y = (index / DISPLAY_WIDTH) as u32;
            let rect = Rect::new((x * scale) as i32, (y * scale) as i32, scale, scale);
            canvas
                .fill_rect(rect)
                .map_err(AppError::from)
                .context("error drawing to canvas")?;
        }
        canvas.present();

        thread::sleep(Duration::from_millis(1));
    }

    // unblock a pending key wait, then stop the machine
    cancel.cancel();
    let _ = command_tx.send(Command::Quit);
    worker
        .join()
        .map_err(|_| anyhow::anyhow!("machine thread panicked"))?;

    audio_device.pause();
    Ok(())
}
