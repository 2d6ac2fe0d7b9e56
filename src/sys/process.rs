use crate::{Guest, GuestError, GuestResult, Host, entries::raw_count};
use std::{
    collections::{BTreeMap, HashMap},
    ffi::{CStr, CString},
};

/// Result of starting a host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostProcessResult {
    pid: u64,
    exit_code: Option<i64>,
}

impl HostProcessResult {
    /// A process that is still running.
    pub const fn running(pid: u64) -> Self {
        Self { pid, exit_code: None }
    }

    /// A process that ran to completion.
    pub const fn exited(pid: u64, exit_code: i64) -> Self {
        Self { pid, exit_code: Some(exit_code) }
    }

    /// Process id on the host.
    pub const fn pid(&self) -> u64 {
        self.pid
    }

    /// Exit code, if the process has exited.
    pub const fn exit_code(&self) -> Option<i64> {
        self.exit_code
    }

    /// Returns `true` if the process exited.
    pub const fn is_exited(&self) -> bool {
        self.exit_code.is_some()
    }
}

/// A validated request to start a host process, as handed to a [`Host`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    command: CString,
    environment: Vec<(CString, CString)>,
    wait: bool,
}

impl ProcessRequest {
    /// The command line, including arguments.
    pub fn command(&self) -> &CStr {
        &self.command
    }

    /// Environment variables, sorted by key.
    pub fn environment(&self) -> impl Iterator<Item = (&CStr, &CStr)> {
        self.environment.iter().map(|(k, v)| (k.as_c_str(), v.as_c_str()))
    }

    /// Whether the call returns only after the process exited.
    pub const fn wait(&self) -> bool {
        self.wait
    }

    /// Lays the request out for the raw import. Pointers are valid for the
    /// duration of `f`.
    #[cfg_attr(not(target_family = "wasm"), allow(dead_code))]
    pub(crate) fn with_raw<R>(
        &self,
        f: impl FnOnce(&ffi::StartProcessRequest) -> R,
    ) -> GuestResult<R> {
        let num_env_vars = raw_count(self.environment.len())?;
        let env_vars: Vec<ffi::EnvironmentVariable> = self
            .environment
            .iter()
            .map(|(k, v)| ffi::EnvironmentVariable { key: k.as_ptr(), value: v.as_ptr() })
            .collect();
        Ok(f(&ffi::StartProcessRequest {
            command: self.command.as_ptr(),
            env_vars: env_vars.as_ptr(),
            num_env_vars,
            wait: self.wait,
        }))
    }
}

/// Builder for processes run on the host.
///
/// ```
/// use sandbox_guest::{Guest, HostProcess, HostProcessResult, MemoryHost};
/// use std::collections::HashMap;
///
/// let host = MemoryHost::new();
/// host.on_start_process(|_| Ok(HostProcessResult::exited(7, 0)));
/// let guest = Guest::new(host);
///
/// let env: HashMap<String, String> = [("MY_VAR".to_owned(), "1".to_owned())].into();
/// let result = HostProcess::new("make -j4")
///     .wait(true)
///     .environment_variables(&env)
///     .start(&guest)
///     .unwrap();
/// assert!(result.is_exited());
/// ```
#[derive(Debug, Clone, Default)]
pub struct HostProcess {
    command: String,
    wait: bool,
    environment_variables: BTreeMap<String, String>,
}

impl HostProcess {
    /// Creates a builder for `command`, which includes the program's
    /// arguments. By default the call does not wait for the process to exit.
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into(), ..Default::default() }
    }

    /// Whether to wait for the process to exit before returning.
    pub const fn wait(&mut self, wait: bool) -> &mut Self {
        self.wait = wait;
        self
    }

    /// Adds environment variables. Repeated calls extend the set; later
    /// values win for duplicate keys.
    pub fn environment_variables(&mut self, vars: &HashMap<String, String>) -> &mut Self {
        self.environment_variables.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Builds the request without starting anything.
    pub fn request(&self) -> GuestResult<ProcessRequest> {
        let command = CString::new(self.command.as_str())
            .map_err(|e| GuestError::invalid_name("command", &self.command, e))?;
        let environment = self
            .environment_variables
            .iter()
            .map(|(k, v)| {
                let key = CString::new(k.as_str())
                    .map_err(|e| GuestError::invalid_name("environment variable key", k, e))?;
                let value = CString::new(v.as_str())
                    .map_err(|e| GuestError::invalid_name("environment variable value", v, e))?;
                Ok((key, value))
            })
            .collect::<GuestResult<Vec<_>>>()?;
        Ok(ProcessRequest { command, environment, wait: self.wait })
    }

    /// Starts the process through the guest's host.
    pub fn start<H: Host>(&self, guest: &Guest<H>) -> GuestResult<HostProcessResult> {
        let request = self.request()?;
        tracing::debug!(
            target: "sandbox_guest",
            command = %self.command,
            wait = self.wait,
            env_vars = request.environment.len(),
            "starting host process"
        );
        guest.host().start_process(&request)
    }
}
