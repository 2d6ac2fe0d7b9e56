//! An in-process [`Host`].

use crate::{
    ChannelKind, Element, GuestError, GuestResult, HostProcessResult, ProcessRequest, Values,
    sys::{Availability, Host},
};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::{
    collections::{HashMap, HashSet, VecDeque},
    ffi::CStr,
    fmt,
    path::PathBuf,
    sync::Arc,
};

type ProcessResponder = Arc<dyn Fn(&ProcessRequest) -> GuestResult<HostProcessResult> + Send + Sync>;
type ConnectResponder = Arc<dyn Fn(&str) -> GuestResult<i32> + Send + Sync>;

#[derive(Debug)]
struct Channel {
    values: Values,
    closed: bool,
}

impl Channel {
    const fn new(kind: ChannelKind) -> Self {
        Self { values: Values::new(kind), closed: false }
    }
}

#[derive(Default)]
struct State {
    inputs: HashMap<String, Channel>,
    outputs: HashMap<String, Channel>,
    read_failures: HashMap<String, VecDeque<String>>,
    append_failures: HashMap<String, VecDeque<String>>,
    read_calls: usize,
    attachments: HashMap<String, PathBuf>,
    host_paths: HashSet<PathBuf>,
    host_os: Option<String>,
    function_error: Option<String>,
    on_start_process: Option<ProcessResponder>,
    on_connect: Option<ConnectResponder>,
}

impl State {
    fn input(&self, key: &str) -> GuestResult<&Channel> {
        self.inputs
            .get(key)
            .ok_or_else(|| GuestError::Host(format!("unknown input channel \"{key}\"")))
    }

    fn input_mut(&mut self, key: &str) -> GuestResult<&mut Channel> {
        self.inputs
            .get_mut(key)
            .ok_or_else(|| GuestError::Host(format!("unknown input channel \"{key}\"")))
    }

    fn output(&self, key: &str) -> GuestResult<&Channel> {
        self.outputs
            .get(key)
            .ok_or_else(|| GuestError::Host(format!("unknown output channel \"{key}\"")))
    }

    fn output_mut(&mut self, key: &str) -> GuestResult<&mut Channel> {
        self.outputs
            .get_mut(key)
            .ok_or_else(|| GuestError::Host(format!("unknown output channel \"{key}\"")))
    }

    fn take_failure(failures: &mut HashMap<String, VecDeque<String>>, key: &str) -> GuestResult<()> {
        match failures.get_mut(key).and_then(VecDeque::pop_front) {
            Some(msg) => Err(GuestError::Host(msg)),
            None => Ok(()),
        }
    }
}

fn column<'a, T: Element>(
    channel: &'a mut Channel,
    key: &str,
) -> GuestResult<&'a mut VecDeque<T>> {
    let actual = channel.values.kind();
    T::column(&mut channel.values).ok_or_else(|| {
        GuestError::Host(format!(
            "channel \"{key}\" holds {actual} elements, not {}",
            T::KIND
        ))
    })
}

struct Shared {
    state: Mutex<State>,
    changed: Condvar,
}

/// A host that keeps every channel in memory.
///
/// Cloning yields another handle to the same channels, so one clone can act
/// as the producer on another thread while a [`Guest`](crate::Guest) reads
/// from a second clone. Blocking reads park the calling thread until enough
/// items have been pushed or the channel is closed.
///
/// ```
/// use sandbox_guest::{Guest, MemoryHost};
///
/// let host = MemoryHost::new();
/// host.add_closed_input("numbers", [1i64, 2, 3]);
/// host.add_output::<String>("names");
///
/// let guest = Guest::new(host.clone());
/// assert_eq!(guest.get_many::<i64>("numbers", true, 10).unwrap(), Some(vec![1, 2, 3]));
/// guest.append_output("names", &["ada".to_owned()]).unwrap();
/// assert_eq!(host.output::<String>("names").unwrap(), vec!["ada".to_owned()]);
/// ```
#[derive(Clone)]
pub struct MemoryHost {
    inner: Arc<Shared>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("MemoryHost")
            .field("inputs", &state.inputs.len())
            .field("outputs", &state.outputs.len())
            .field("read_calls", &state.read_calls)
            .finish_non_exhaustive()
    }
}

impl MemoryHost {
    /// Creates a host without channels.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Shared { state: Mutex::new(State::default()), changed: Condvar::new() }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock()
    }

    /// Declares an empty, open input channel carrying `T`, replacing any
    /// input of the same name.
    pub fn add_input<T: Element>(&self, key: &str) {
        self.state().inputs.insert(key.to_owned(), Channel::new(T::KIND));
        self.inner.changed.notify_all();
    }

    /// Declares an input channel holding `items` that is already closed.
    pub fn add_closed_input<T: Element>(&self, key: &str, items: impl IntoIterator<Item = T>) {
        let channel = Channel { values: Values::from_items(items), closed: true };
        self.state().inputs.insert(key.to_owned(), channel);
        self.inner.changed.notify_all();
    }

    /// Appends items to an input channel, waking blocked readers.
    pub fn push<T: Element>(&self, key: &str, items: impl IntoIterator<Item = T>) -> GuestResult<()> {
        let mut state = self.state();
        let channel = state.input_mut(key)?;
        if channel.closed {
            return Err(GuestError::Host(format!("input channel \"{key}\" is closed")));
        }
        column::<T>(channel, key)?.extend(items);
        drop(state);
        self.inner.changed.notify_all();
        Ok(())
    }

    /// Closes an input channel. Items already pushed remain readable.
    pub fn close_input(&self, key: &str) -> GuestResult<()> {
        self.state().input_mut(key)?.closed = true;
        self.inner.changed.notify_all();
        Ok(())
    }

    /// Declares an empty, open output channel carrying `T`.
    pub fn add_output<T: Element>(&self, key: &str) {
        self.state().outputs.insert(key.to_owned(), Channel::new(T::KIND));
    }

    /// Everything appended to an output channel so far.
    pub fn output<T: Element>(&self, key: &str) -> GuestResult<Vec<T>> {
        let state = self.state();
        let channel = state.output(key)?;
        let actual = channel.values.kind();
        T::column_ref(&channel.values)
            .map(|items| items.iter().cloned().collect())
            .ok_or_else(|| {
                GuestError::Host(format!("channel \"{key}\" holds {actual} elements, not {}", T::KIND))
            })
    }

    /// Whether the guest closed an output channel.
    pub fn output_is_closed(&self, key: &str) -> GuestResult<bool> {
        Ok(self.state().output(key)?.closed)
    }

    /// Makes the next read of `key` fail with `message`. Failures queue up.
    pub fn fail_next_read(&self, key: &str, message: impl Into<String>) {
        self.state().read_failures.entry(key.to_owned()).or_default().push_back(message.into());
    }

    /// Makes the next append to `key` fail with `message`. Failures queue up.
    pub fn fail_next_append(&self, key: &str, message: impl Into<String>) {
        self.state().append_failures.entry(key.to_owned()).or_default().push_back(message.into());
    }

    /// Number of reads served so far, failed ones included.
    pub fn read_calls(&self) -> usize {
        self.state().read_calls
    }

    /// Registers an attachment and the path it maps to.
    pub fn add_attachment(&self, name: &str, path: impl Into<PathBuf>) {
        self.state().attachments.insert(name.to_owned(), path.into());
    }

    /// Registers a path as existing on the host.
    pub fn add_host_path(&self, path: impl Into<PathBuf>) {
        self.state().host_paths.insert(path.into());
    }

    /// Overrides the reported host OS name. Defaults to the OS this process
    /// runs on.
    pub fn set_host_os(&self, name: impl Into<String>) {
        self.state().host_os = Some(name.into());
    }

    /// The last message reported through
    /// [`Guest::set_function_error`](crate::Guest::set_function_error).
    pub fn function_error(&self) -> Option<String> {
        self.state().function_error.clone()
    }

    /// Installs the handler for process start requests.
    pub fn on_start_process<F>(&self, f: F)
    where
        F: Fn(&ProcessRequest) -> GuestResult<HostProcessResult> + Send + Sync + 'static,
    {
        self.state().on_start_process = Some(Arc::new(f));
    }

    /// Installs the handler for connect requests. It receives the dialed
    /// url and returns a file descriptor the guest takes ownership of.
    pub fn on_connect<F>(&self, f: F)
    where
        F: Fn(&str) -> GuestResult<i32> + Send + Sync + 'static,
    {
        self.state().on_connect = Some(Arc::new(f));
    }
}

impl Host for MemoryHost {
    fn availability(&self, key: &CStr) -> GuestResult<Availability> {
        let key = key.to_string_lossy();
        let state = self.state();
        let channel = state.input(&key)?;
        Ok(Availability { available: channel.values.len(), closed: channel.closed })
    }

    fn channel_kind(&self, key: &CStr) -> GuestResult<ChannelKind> {
        let key = key.to_string_lossy();
        let state = self.state();
        state
            .inputs
            .get(&*key)
            .or_else(|| state.outputs.get(&*key))
            .map(|channel| channel.values.kind())
            .ok_or_else(|| GuestError::Host(format!("unknown channel \"{key}\"")))
    }

    fn read<T: Element>(&self, key: &CStr, max_count: usize) -> GuestResult<Vec<T>> {
        let key = key.to_string_lossy();
        let mut state = self.state();
        state.read_calls += 1;
        State::take_failure(&mut state.read_failures, &key)?;
        loop {
            let channel = state.input(&key)?;
            if channel.closed || channel.values.len() >= max_count {
                break;
            }
            self.inner.changed.wait(&mut state);
        }
        let items = column::<T>(state.input_mut(&key)?, &key)?;
        let n = max_count.min(items.len());
        Ok(items.drain(..n).collect())
    }

    fn output_closed(&self, key: &CStr) -> GuestResult<bool> {
        Ok(self.state().output(&key.to_string_lossy())?.closed)
    }

    fn append<T: Element>(&self, key: &CStr, items: &[T]) -> GuestResult<()> {
        let key = key.to_string_lossy();
        let mut state = self.state();
        State::take_failure(&mut state.append_failures, &key)?;
        let channel = state.output_mut(&key)?;
        if channel.closed {
            return Err(GuestError::Host(format!("output channel \"{key}\" is closed")));
        }
        column::<T>(channel, &key)?.extend(items.iter().cloned());
        Ok(())
    }

    fn close_output(&self, key: &CStr) -> GuestResult<()> {
        self.state().output_mut(&key.to_string_lossy())?.closed = true;
        Ok(())
    }

    fn map_attachment(&self, name: &CStr, _unpack: bool) -> GuestResult<String> {
        let name = name.to_string_lossy();
        self.state()
            .attachments
            .get(&*name)
            .map(|path| path.to_string_lossy().into_owned())
            .ok_or_else(|| GuestError::Host(format!("no attachment named \"{name}\"")))
    }

    fn host_path_exists(&self, path: &CStr) -> GuestResult<bool> {
        let path = PathBuf::from(path.to_string_lossy().into_owned());
        Ok(self.state().host_paths.contains(&path))
    }

    fn host_os(&self) -> GuestResult<String> {
        Ok(self.state().host_os.clone().unwrap_or_else(|| std::env::consts::OS.to_owned()))
    }

    fn start_process(&self, request: &ProcessRequest) -> GuestResult<HostProcessResult> {
        let responder = self.state().on_start_process.clone().ok_or_else(|| {
            GuestError::Host("starting host processes is not supported".to_owned())
        })?;
        responder(request)
    }

    fn set_error(&self, message: &CStr) -> GuestResult<()> {
        self.state().function_error = Some(message.to_string_lossy().into_owned());
        Ok(())
    }

    fn connect(&self, address: &CStr) -> GuestResult<i32> {
        let responder = self
            .state()
            .on_connect
            .clone()
            .ok_or_else(|| GuestError::Host("network access is not allowed".to_owned()))?;
        responder(&address.to_string_lossy())
    }
}
