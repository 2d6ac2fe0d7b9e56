#![allow(missing_docs)]
mod common;

use common::guest;
use sandbox_guest::{GuestError, HostOs, HostProcess, HostProcessResult};
use std::{collections::HashMap, path::Path};

#[test]
fn process_request_reaches_host() {
    let (host, guest) = guest();
    host.on_start_process(|req| {
        assert_eq!(req.command().to_str().unwrap(), "convert in.png out.jpg");
        let env: Vec<_> = req
            .environment()
            .map(|(k, v)| format!("{}={}", k.to_str().unwrap(), v.to_str().unwrap()))
            .collect();
        assert_eq!(env, vec!["A=1".to_owned(), "B=2".to_owned()]);
        Ok(if req.wait() { HostProcessResult::exited(42, 3) } else { HostProcessResult::running(42) })
    });

    let a: HashMap<String, String> = [("A".to_owned(), "1".to_owned())].into();
    let b: HashMap<String, String> = [("B".to_owned(), "2".to_owned())].into();
    let mut process = HostProcess::new("convert in.png out.jpg");
    process.environment_variables(&a).environment_variables(&b);

    let running = process.start(&guest).unwrap();
    assert!(!running.is_exited());
    assert_eq!(running.pid(), 42);

    let exited = process.wait(true).start(&guest).unwrap();
    assert!(exited.is_exited());
    assert_eq!(exited.exit_code(), Some(3));
}

#[test]
fn process_start_without_support_fails() {
    let (_host, guest) = guest();
    let err = HostProcess::new("true").start(&guest).unwrap_err();
    assert!(matches!(err, GuestError::Host(_)));
}

#[test]
fn host_os_defaults_to_current() {
    let (_host, guest) = guest();
    let os = guest.host_os();
    if let Ok(os) = os {
        assert_eq!(os.as_str(), std::env::consts::OS);
    }
}

#[test]
fn host_os_override() {
    let (host, guest) = guest();
    host.set_host_os("windows");
    let os = guest.host_os().unwrap();
    assert_eq!(os, HostOs::Windows);
    assert!(!os.is_unix());
}

#[test]
fn attachments_and_paths() {
    let (host, guest) = guest();
    host.add_attachment("weights", "/sandbox/attachments/weights");
    host.add_host_path("/data/shared");

    assert_eq!(
        guest.map_attachment("weights", true).unwrap(),
        Path::new("/sandbox/attachments/weights")
    );
    assert!(guest.host_path_exists(Path::new("/data/shared")).unwrap());
    assert!(!guest.host_path_exists(Path::new("/data/private")).unwrap());
}

#[test]
fn function_error_is_recorded() {
    let (host, guest) = guest();
    assert_eq!(host.function_error(), None);
    guest.set_function_error("bad input").unwrap();
    assert_eq!(host.function_error().as_deref(), Some("bad input"));
    assert!(matches!(
        guest.set_function_error("nul\0byte"),
        Err(GuestError::InvalidArgument(_))
    ));
}

#[cfg(unix)]
mod net {
    use super::common::guest;
    use sandbox_guest::{GuestError, TcpStream, UdpSocket};
    use std::{
        io::{Read, Seek, SeekFrom, Write},
        os::fd::IntoRawFd,
    };

    #[test]
    fn tcp_stream_wraps_host_descriptor() {
        let (host, guest) = guest();
        let mut file = tempfile::tempfile().unwrap();
        let fd = file.try_clone().unwrap().into_raw_fd();
        host.on_connect(move |url| {
            assert_eq!(url, "tcp://example.com:443");
            Ok(fd)
        });

        let mut stream = TcpStream::connect(&guest, "example.com:443").unwrap();
        assert_eq!(stream.peer_addr().host(), "example.com");
        stream.write_all(b"hello host").unwrap();
        stream.flush().unwrap();
        drop(stream);

        file.seek(SeekFrom::Start(0)).unwrap();
        let mut written = String::new();
        file.read_to_string(&mut written).unwrap();
        assert_eq!(written, "hello host");
    }

    #[test]
    fn udp_socket_sends_and_receives() {
        let (host, guest) = guest();
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"pong").unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        let fd = file.try_clone().unwrap().into_raw_fd();
        host.on_connect(move |url| {
            assert_eq!(url, "udp://dns.internal:53");
            Ok(fd)
        });

        let mut socket = UdpSocket::connect(&guest, &("dns.internal", 53u16)).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(socket.recv(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"pong");
        assert_eq!(socket.send(b"ping").unwrap(), 4);
    }

    #[test]
    fn ip_literals_never_reach_host() {
        let (_host, guest) = guest();
        let err = TcpStream::connect(&guest, "192.168.1.1:80").unwrap_err();
        assert!(matches!(err, GuestError::InvalidArgument(_)));
    }

    #[test]
    fn connect_without_permission_fails() {
        let (_host, guest) = guest();
        let err = UdpSocket::connect(&guest, "example.com:53").unwrap_err();
        assert!(matches!(err, GuestError::Host(_)));
    }
}
