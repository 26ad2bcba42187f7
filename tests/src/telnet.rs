#![cfg(test)]
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use fleetcheck_common::config::Config;
use fleetcheck_common::device::{Credentials, parse_address_list};
use fleetcheck_core::archive::FileArchive;
use fleetcheck_core::audit::DeviceAuditor;
use fleetcheck_core::batch::BatchRunner;
use fleetcheck_protocols::session_provider;
use fleetcheck_protocols::telnet::{IAC, OPT_ECHO, WILL};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Reads one line typed by the client, skipping telnet negotiation replies.
async fn read_line(stream: &mut TcpStream) -> Option<String> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if stream.read(&mut byte).await.ok()? == 0 {
            return None;
        }
        match byte[0] {
            IAC => {
                let mut rest = [0u8; 2];
                stream.read_exact(&mut rest).await.ok()?;
            }
            b'\n' => return String::from_utf8(line).ok(),
            b'\r' => {}
            b => line.push(b),
        }
    }
}

fn output_for(command: &str) -> &'static str {
    match command {
        "sh run | in hostname" => "hostname R1",
        "sh run" => "Building configuration...\r\n!\r\nhostname R1\r\n!\r\nend",
        "sh cdp entry * | in Device.ID" => "Device ID: SW1\r\nDevice ID: SW2",
        "sh version | in bytes of memory" => "cisco 4096K/4096K bytes of memory.",
        "sh version | in System image" => "System image file is \"flash:c2900-universalk9-mz.npe.bin\"",
        "ping 10.177.0.1" => "Type escape sequence to abort.\r\nSuccess rate is 100 percent (5/5)",
        "sh ntp status | in Clock is" => "Clock is synchronized, stratum 4, reference is 10.177.0.1",
        _ => "",
    }
}

/// Plays a router with an enable secret. Records every line received after login.
async fn serve_router(mut stream: TcpStream, received: Arc<Mutex<Vec<String>>>) -> Option<()> {
    stream.write_all(&[IAC, WILL, OPT_ECHO]).await.ok()?;
    stream.write_all(b"\r\nUser Access Verification\r\n\r\nUsername: ").await.ok()?;
    read_line(&mut stream).await?;
    stream.write_all(b"Password: ").await.ok()?;
    read_line(&mut stream).await?;
    stream.write_all(b"\r\nR1>").await.ok()?;

    if read_line(&mut stream).await? != "enable" {
        return None;
    }
    stream.write_all(b"\r\nPassword: ").await.ok()?;
    if read_line(&mut stream).await? != "secret" {
        stream.write_all(b"\r\n% Bad secrets\r\n\r\nR1>").await.ok()?;
        return None;
    }
    stream.write_all(b"\r\nR1#").await.ok()?;

    let mut prompt = "R1#";
    loop {
        let line = read_line(&mut stream).await?;
        received.lock().unwrap().push(line.clone());

        let output = match line.as_str() {
            "exit" => return Some(()),
            "configure terminal" => {
                prompt = "R1(config)#";
                "Enter configuration commands, one per line.  End with CNTL/Z."
            }
            "end" => {
                prompt = "R1#";
                ""
            }
            _ if prompt != "R1#" => "",
            cmd => output_for(cmd),
        };

        let mut reply = format!("{line}\r\n");
        if !output.is_empty() {
            reply.push_str(output);
            reply.push_str("\r\n");
        }
        reply.push_str(prompt);
        stream.write_all(reply.as_bytes()).await.ok()?;
    }
}

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("fleetcheck-telnet-{}", rand::random::<u64>()))
}

#[tokio::test]
async fn audits_a_router_over_telnet() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let received = Arc::new(Mutex::new(Vec::new()));

    let device_log = received.clone();
    let device = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        serve_router(stream, device_log).await
    });

    let dir = scratch_dir();
    let mut cfg = Config::default();
    cfg.output_dir = dir.clone();
    cfg.ntp.settle_delay = Duration::ZERO;
    cfg.command_timeout = Duration::from_secs(5);
    cfg.transport.port = port;
    cfg.transport.session_timeout = Duration::from_secs(5);

    let auditor = DeviceAuditor::from_config(&cfg, Box::new(FileArchive::new(&dir)));
    let runner = BatchRunner::new(session_provider(&cfg), auditor)
        .with_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

    let batch = runner
        .run(
            &parse_address_list("127.0.0.1").unwrap(),
            &Credentials::new("admin", "pw", "secret"),
            |_, _| {},
        )
        .await;

    assert_eq!(
        batch.report_lines(),
        vec!["R1 | 4096K/4096K | c2900-universalk9-mz.npe.bin | NPE | CDP is ON, 2 peers | Clock in SYNCED"]
    );
    assert_eq!(device.await.unwrap(), Some(()));

    let received = received.lock().unwrap();
    assert_eq!(received.first().map(String::as_str), Some("terminal length 0"));
    let config_start = received.iter().position(|l| l == "configure terminal").unwrap();
    assert_eq!(
        &received[config_start..config_start + 4],
        &["configure terminal", "clock timezone GMT 0", "ntp server 10.177.0.1", "end"]
    );
    assert_eq!(received.last().map(String::as_str), Some("exit"));

    let backup = std::fs::read_to_string(dir.join("2024-03-01_R1")).unwrap();
    assert_eq!(backup, "Building configuration...\n!\nhostname R1\n!\nend");

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn closed_port_is_reported_as_a_connection_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let dir = scratch_dir();
    let mut cfg = Config::default();
    cfg.output_dir = dir.clone();
    cfg.transport.port = port;
    cfg.transport.session_timeout = Duration::from_secs(2);

    let auditor = DeviceAuditor::from_config(&cfg, Box::new(FileArchive::new(&dir)));
    let runner = BatchRunner::new(session_provider(&cfg), auditor);

    let batch = runner
        .run(
            &parse_address_list("127.0.0.1").unwrap(),
            &Credentials::new("admin", "pw", "secret"),
            |_, _| {},
        )
        .await;

    assert_eq!(batch.report_lines(), vec!["Failed to connect to 127.0.0.1"]);
    assert!(!dir.exists());
}
