//! Loading of the two raymarch program texts and the one-shot gate that
//! releases them for pipeline construction.

use crate::{error::ShaderLoadError, uniforms::wgsl_preamble};
use crossbeam_channel::{Receiver, Sender};
use std::{
    fmt,
    path::{Path, PathBuf},
    thread,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Both program texts, ready for pipeline construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    /// Fragment text with the uniform preamble already prepended.
    pub fragment: String,
}

/// Outcome of one fetch.
#[derive(Debug)]
pub struct ShaderFetch {
    pub stage: ShaderStage,
    pub result: Result<String, ShaderLoadError>,
}

/// Receives fetch failures.
pub trait DiagnosticSink {
    fn report(&mut self, error: ShaderLoadError);
}

/// Reports to the `log` facade at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, error: ShaderLoadError) {
        log::error!("Shader load failed: {}", error);
    }
}

impl DiagnosticSink for Vec<ShaderLoadError> {
    fn report(&mut self, error: ShaderLoadError) {
        self.push(error);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No fetch has been started.
    Idle,
    /// Both fetches outstanding.
    AwaitingBoth,
    /// Only the named stage is still outstanding.
    AwaitingOne(ShaderStage),
    /// Sources were released; the pipeline exists.
    Built,
    /// A fetch failed. Terminal: nothing is ever released.
    Failed(ShaderStage),
}

/// Collects the two texts and releases them exactly once.
#[derive(Debug)]
pub struct ShaderGate {
    state: GateState,
    vertex: Option<String>,
    fragment: Option<String>,
}

impl Default for ShaderGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Idle,
            vertex: None,
            fragment: None,
        }
    }

    #[inline]
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Marks both fetches as started.
    pub fn begin(&mut self) {
        if self.state == GateState::Idle {
            self.state = GateState::AwaitingBoth;
        }
    }

    /// Feeds one fetch outcome. Returns the sources when this completion is
    /// the one that makes both present, and never again afterwards; the
    /// gate keeps no copy once they are released.
    pub fn complete(
        &mut self,
        fetch: ShaderFetch,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<ShaderSources> {
        let ShaderFetch { stage, result } = fetch;

        let text = match result {
            Ok(text) => text,
            Err(err) => {
                if !matches!(self.state, GateState::Built | GateState::Failed(_)) {
                    self.state = GateState::Failed(stage);
                }
                sink.report(err);
                return None;
            }
        };

        log::debug!("{} program fetched ({} bytes)", stage, text.len());

        if matches!(self.state, GateState::Built | GateState::Failed(_)) {
            return None;
        }

        match stage {
            ShaderStage::Vertex => self.vertex = Some(text),
            ShaderStage::Fragment => self.fragment = Some(format!("{}{}", wgsl_preamble(), text)),
        }

        match (self.vertex.is_some(), self.fragment.is_some()) {
            (true, true) => {
                self.state = GateState::Built;
                let vertex = self.vertex.take()?;
                let fragment = self.fragment.take()?;
                Some(ShaderSources { vertex, fragment })
            }
            (true, false) => {
                self.state = GateState::AwaitingOne(ShaderStage::Fragment);
                None
            }
            (false, true) => {
                self.state = GateState::AwaitingOne(ShaderStage::Vertex);
                None
            }
            (false, false) => None,
        }
    }
}

/// Reads one program text. An empty file counts as a failed fetch.
pub fn fetch_source(stage: ShaderStage, path: &Path) -> Result<String, ShaderLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| ShaderLoadError::Io {
        stage,
        path: path.to_path_buf(),
        source,
    })?;

    if text.trim().is_empty() {
        return Err(ShaderLoadError::Empty {
            stage,
            path: path.to_path_buf(),
        });
    }
    Ok(text)
}

/// Runs both fetches off the render thread and feeds their completions,
/// in whatever order they land, through a [`ShaderGate`].
#[derive(Debug)]
pub struct ShaderLoader {
    gate: ShaderGate,
    rx: Receiver<ShaderFetch>,
}

impl ShaderLoader {
    /// Spawns one reader thread per stage.
    pub fn spawn(vertex_path: PathBuf, fragment_path: PathBuf) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(2);

        spawn_fetch(ShaderStage::Vertex, vertex_path, tx.clone());
        spawn_fetch(ShaderStage::Fragment, fragment_path, tx);

        Self::from_receiver(rx)
    }

    /// A loader fed by an arbitrary source of completions.
    pub fn from_receiver(rx: Receiver<ShaderFetch>) -> Self {
        let mut gate = ShaderGate::new();
        gate.begin();
        Self { gate, rx }
    }

    #[inline]
    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    /// Drains completions that have landed since the last call and runs
    /// `build` if they made both sources available. Never blocks.
    pub fn poll<T>(
        &mut self,
        sink: &mut dyn DiagnosticSink,
        build: impl FnOnce(ShaderSources) -> T,
    ) -> Option<T> {
        let mut ready = None;
        for fetch in self.rx.try_iter() {
            if let Some(sources) = self.gate.complete(fetch, sink) {
                ready = Some(sources);
            }
        }
        ready.map(build)
    }
}

fn spawn_fetch(stage: ShaderStage, path: PathBuf, tx: Sender<ShaderFetch>) {
    let report = tx.clone();
    let thread_path = path.clone();
    let spawned = thread::Builder::new()
        .name(format!("shader-fetch-{stage}"))
        .spawn(move || {
            let result = fetch_source(stage, &thread_path);
            // The loader may already be gone at shutdown.
            let _ = tx.send(ShaderFetch { stage, result });
        });

    if let Err(e) = spawned {
        let _ = report.send(spawn_failure(stage, path, e));
    }
}

/// A thread that never started still settles its stage, as a failed fetch.
fn spawn_failure(stage: ShaderStage, path: PathBuf, source: std::io::Error) -> ShaderFetch {
    ShaderFetch {
        stage,
        result: Err(ShaderLoadError::Io { stage, path, source }),
    }
}
