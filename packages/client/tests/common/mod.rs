//! Scripted in-process engine for lifecycle tests
//!
//! The real network engine is out of scope, so scenario tests drive the
//! client through an engine whose per-request thread plays back a step
//! script (delays, redirects, responses, failures) via the callback trait.
//! The thread is the "engine-managed thread" of the production contract:
//! every callback the client code sees here arrives off-thread, exactly as
//! it would from a real engine.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use courier_client::engine::{
    EngineStatus, RequestCallbacks, RequestParameters, ResponseInfo, UploadDataProvider,
    UploadDataSink, UrlEngine, UrlRequest,
};

/// How long the scripted thread waits for the client to act (follow a
/// redirect, issue a read) before assuming the request was abandoned.
const GIVE_UP_AFTER: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub enum Step {
    /// Sleep, waking early on cancellation.
    Delay(Duration),
    /// Announce a redirect and wait for `follow_redirect`.
    Redirect { location: String },
    /// Serve a response; body bytes are handed out through the read loop.
    Respond {
        status: u16,
        status_text: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    },
    /// Drain the upload provider and serve its bytes back as the body.
    EchoUpload { status: u16 },
    /// Report an asynchronous engine failure.
    Fail { code: i32, message: String },
}

impl Step {
    pub fn ok(body: &[u8]) -> Step {
        Step::Respond {
            status: 200,
            status_text: "OK".to_string(),
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: body.to_vec(),
        }
    }

    pub fn redirect(location: &str) -> Step {
        Step::Redirect {
            location: location.to_string(),
        }
    }
}

pub struct ScriptedEngine {
    script: Vec<Step>,
    start_error: Option<EngineStatus>,
    shutdown_error: Option<EngineStatus>,
    /// Parameters of every request opened against this engine.
    pub opened: Mutex<Vec<RequestParameters>>,
}

impl ScriptedEngine {
    pub fn new(script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script,
            start_error: None,
            shutdown_error: None,
            opened: Mutex::new(Vec::new()),
        })
    }

    /// An engine whose `start` fails synchronously.
    pub fn failing_start(status: EngineStatus) -> Arc<Self> {
        Arc::new(Self {
            script: Vec::new(),
            start_error: Some(status),
            shutdown_error: None,
            opened: Mutex::new(Vec::new()),
        })
    }

    pub fn last_params(&self) -> Option<RequestParameters> {
        self.opened.lock().unwrap().last().cloned()
    }
}

impl UrlEngine for ScriptedEngine {
    fn open_request(
        &self,
        params: &RequestParameters,
        callbacks: Arc<dyn RequestCallbacks>,
        upload: Option<Arc<dyn UploadDataProvider>>,
    ) -> Result<Arc<dyn UrlRequest>, EngineStatus> {
        self.opened.lock().unwrap().push(params.clone());
        Ok(Arc::new(ScriptedRequest {
            shared: Arc::new(Shared {
                url: Mutex::new(params.url.clone()),
                script: self.script.clone(),
                start_error: self.start_error.clone(),
                callbacks,
                upload,
                signals: Mutex::new(Signals::default()),
                wakeup: Condvar::new(),
                canceled: AtomicBool::new(false),
            }),
        }))
    }

    fn shutdown(&self) -> Result<(), EngineStatus> {
        match &self.shutdown_error {
            Some(status) => Err(status.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
struct Signals {
    follow: bool,
    reads: VecDeque<Vec<u8>>,
}

struct Shared {
    url: Mutex<String>,
    script: Vec<Step>,
    start_error: Option<EngineStatus>,
    callbacks: Arc<dyn RequestCallbacks>,
    upload: Option<Arc<dyn UploadDataProvider>>,
    signals: Mutex<Signals>,
    wakeup: Condvar,
    canceled: AtomicBool,
}

#[derive(Clone)]
struct ScriptedRequest {
    shared: Arc<Shared>,
}

impl UrlRequest for ScriptedRequest {
    fn start(&self) -> Result<(), EngineStatus> {
        if let Some(status) = &self.shared.start_error {
            return Err(status.clone());
        }
        let shared = self.shared.clone();
        thread::spawn(move || run_script(&shared));
        Ok(())
    }

    fn follow_redirect(&self) {
        let mut signals = self.shared.signals.lock().unwrap();
        signals.follow = true;
        self.shared.wakeup.notify_all();
    }

    fn read(&self, buffer: Vec<u8>) {
        let mut signals = self.shared.signals.lock().unwrap();
        signals.reads.push_back(buffer);
        self.shared.wakeup.notify_all();
    }

    fn cancel(&self) {
        self.shared.canceled.store(true, Ordering::Release);
        self.shared.wakeup.notify_all();
    }
}

enum Waited {
    Follow,
    Read(Vec<u8>),
    Canceled,
    GaveUp,
}

fn wait_for(shared: &Shared, want_follow: bool) -> Waited {
    let deadline = Instant::now() + GIVE_UP_AFTER;
    let mut signals = shared.signals.lock().unwrap();
    loop {
        if shared.canceled.load(Ordering::Acquire) {
            return Waited::Canceled;
        }
        if want_follow && signals.follow {
            signals.follow = false;
            return Waited::Follow;
        }
        if !want_follow {
            if let Some(buffer) = signals.reads.pop_front() {
                return Waited::Read(buffer);
            }
        }
        let now = Instant::now();
        if now >= deadline {
            return Waited::GaveUp;
        }
        let (guard, _) = shared.wakeup.wait_timeout(signals, deadline - now).unwrap();
        signals = guard;
    }
}

/// Sleep for `duration`, waking early on cancellation. Returns true when
/// canceled.
fn sleep_unless_canceled(shared: &Shared, duration: Duration) -> bool {
    let deadline = Instant::now() + duration;
    let mut signals = shared.signals.lock().unwrap();
    loop {
        if shared.canceled.load(Ordering::Acquire) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        let (guard, _) = shared.wakeup.wait_timeout(signals, deadline - now).unwrap();
        signals = guard;
    }
}

fn run_script(shared: &Arc<Shared>) {
    let request = ScriptedRequest {
        shared: shared.clone(),
    };
    let callbacks = shared.callbacks.clone();

    for step in shared.script.clone() {
        if shared.canceled.load(Ordering::Acquire) {
            callbacks.on_canceled(None);
            return;
        }
        match step {
            Step::Delay(duration) => {
                if sleep_unless_canceled(shared, duration) {
                    callbacks.on_canceled(None);
                    return;
                }
            }
            Step::Redirect { location } => {
                let info = redirect_info(&shared.url.lock().unwrap(), &location);
                callbacks.on_redirect_received(&request, &info, &location);
                match wait_for(shared, true) {
                    Waited::Follow => {
                        *shared.url.lock().unwrap() = location;
                    }
                    Waited::Canceled => {
                        callbacks.on_canceled(None);
                        return;
                    }
                    // The client resolved without following (blocked
                    // redirect); nothing more to serve.
                    _ => return,
                }
            }
            Step::Respond {
                status,
                status_text,
                headers,
                body,
            } => {
                if let Some(provider) = &shared.upload {
                    if drain_upload(provider.as_ref()).is_err() {
                        callbacks.on_failed(None, EngineStatus::new(9, "upload read failed"));
                        return;
                    }
                }
                serve(shared, &request, status, &status_text, headers, &body);
                return;
            }
            Step::EchoUpload { status } => {
                let uploaded = match &shared.upload {
                    Some(provider) => match drain_upload(provider.as_ref()) {
                        Ok(bytes) => bytes,
                        Err(message) => {
                            callbacks.on_failed(None, EngineStatus::new(9, message));
                            return;
                        }
                    },
                    None => Vec::new(),
                };
                serve(shared, &request, status, "OK", Vec::new(), &uploaded);
                return;
            }
            Step::Fail { code, message } => {
                callbacks.on_failed(None, EngineStatus::new(code, message));
                return;
            }
        }
    }
}

fn serve(
    shared: &Arc<Shared>,
    request: &ScriptedRequest,
    status: u16,
    status_text: &str,
    headers: Vec<(String, String)>,
    body: &[u8],
) {
    let callbacks = shared.callbacks.clone();
    let info = ResponseInfo {
        status_code: status,
        status_text: status_text.to_string(),
        url: shared.url.lock().unwrap().clone(),
        headers,
        was_cached: false,
        negotiated_protocol: "h2".to_string(),
    };

    callbacks.on_response_started(request, &info);

    let mut offset = 0;
    loop {
        match wait_for(shared, false) {
            Waited::Read(mut buffer) => {
                if offset >= body.len() {
                    callbacks.on_succeeded(&info);
                    return;
                }
                let n = (body.len() - offset).min(buffer.len());
                buffer[..n].copy_from_slice(&body[offset..offset + n]);
                offset += n;
                callbacks.on_read_completed(request, buffer, n);
            }
            Waited::Canceled => {
                callbacks.on_canceled(Some(&info));
                return;
            }
            _ => return,
        }
    }
}

fn redirect_info(current_url: &str, location: &str) -> ResponseInfo {
    ResponseInfo {
        status_code: 302,
        status_text: "Found".to_string(),
        url: current_url.to_string(),
        headers: vec![("location".to_string(), location.to_string())],
        was_cached: false,
        negotiated_protocol: "h2".to_string(),
    }
}

/// Pull the whole upload through the provider contract, the way a real
/// engine sends a request body.
fn drain_upload(provider: &dyn UploadDataProvider) -> Result<Vec<u8>, String> {
    let sink = RecordingSink::new();
    let mut collected = Vec::new();
    loop {
        let mut buffer = vec![0u8; 1024];
        provider.read(&sink, &mut buffer);
        match sink.take_last() {
            Some(SinkEvent::ReadSucceeded { bytes, final_chunk }) => {
                collected.extend_from_slice(&buffer[..bytes]);
                if final_chunk {
                    break;
                }
            }
            Some(SinkEvent::ReadError(message)) => return Err(message),
            _ => return Err("upload provider reported nothing".to_string()),
        }
    }
    provider.close();
    Ok(collected)
}

// Recording doubles shared by the bridge and upload tests.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    ReadSucceeded { bytes: usize, final_chunk: bool },
    ReadError(String),
    RewindSucceeded,
    RewindError(String),
}

/// An [`UploadDataSink`] that records every event it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn take_last(&self) -> Option<SinkEvent> {
        self.events.lock().unwrap().pop()
    }
}

impl UploadDataSink for RecordingSink {
    fn on_read_succeeded(&self, bytes_read: usize, final_chunk: bool) {
        self.events.lock().unwrap().push(SinkEvent::ReadSucceeded {
            bytes: bytes_read,
            final_chunk,
        });
    }

    fn on_read_error(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::ReadError(message.to_string()));
    }

    fn on_rewind_succeeded(&self) {
        self.events.lock().unwrap().push(SinkEvent::RewindSucceeded);
    }

    fn on_rewind_error(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::RewindError(message.to_string()));
    }
}

/// A [`UrlRequest`] that records the calls the bridge makes against it.
#[derive(Default)]
pub struct RecordingRequest {
    pub read_capacities: Mutex<Vec<usize>>,
    pub follows: Mutex<u32>,
    pub cancels: Mutex<u32>,
}

impl RecordingRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> Vec<usize> {
        self.read_capacities.lock().unwrap().clone()
    }

    pub fn follow_count(&self) -> u32 {
        *self.follows.lock().unwrap()
    }
}

impl UrlRequest for RecordingRequest {
    fn start(&self) -> Result<(), EngineStatus> {
        Ok(())
    }

    fn follow_redirect(&self) {
        *self.follows.lock().unwrap() += 1;
    }

    fn read(&self, buffer: Vec<u8>) {
        self.read_capacities.lock().unwrap().push(buffer.len());
    }

    fn cancel(&self) {
        *self.cancels.lock().unwrap() += 1;
    }
}

pub fn response_info(status: u16, url: &str, headers: Vec<(String, String)>) -> ResponseInfo {
    ResponseInfo {
        status_code: status,
        status_text: "OK".to_string(),
        url: url.to_string(),
        headers,
        was_cached: false,
        negotiated_protocol: "h2".to_string(),
    }
}
