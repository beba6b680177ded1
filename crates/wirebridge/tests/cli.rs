#![cfg(all(unix, feature = "cli"))]

use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/wbcli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn wait_for_socket(path: &Path, timeout: Duration) {
    let start = Instant::now();
    while UnixStream::connect(path).is_err() {
        if start.elapsed() >= timeout {
            panic!("server did not come up at {}", path.display());
        }
        thread::sleep(Duration::from_millis(25));
    }
}

struct Server {
    child: Child,
    dir: PathBuf,
    sock: PathBuf,
}

impl Server {
    fn start(tag: &str) -> Self {
        let dir = unique_temp_dir(tag);
        let sock = dir.join("host.sock");
        let child = Command::new(env!("CARGO_BIN_EXE_wirebridge"))
            .args(["--log-level", "error", "serve"])
            .arg(&sock)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("serve command should start");
        wait_for_socket(&sock, Duration::from_secs(5));
        Self { child, dir, sock }
    }

    fn call(&self, method: &str, args: &str) -> Output {
        Command::new(env!("CARGO_BIN_EXE_wirebridge"))
            .args(["--log-level", "error", "--format", "json", "call"])
            .arg(&self.sock)
            .args([method, "--args", args, "--timeout", "5s"])
            .output()
            .expect("call should run")
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

#[test]
fn call_echo_int_prints_result() {
    let server = Server::start("echo");
    let output = server.call("echoInt", "[123]");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(stdout.trim()).expect("json output");
    assert_eq!(json["result"], serde_json::json!(123));
    assert_eq!(json["method"], "echoInt");
    assert_eq!(json["channel"], "wirebridge.HostIntegrationCoreApi");
}

#[test]
fn call_renders_composites_by_field_name() {
    let server = Server::start("composite");
    let output = server.call("sendMultipleNullableTypes", r#"[true, null, "s"]"#);
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["result"]["aNullableBool"], serde_json::json!(true));
    assert_eq!(json["result"]["aNullableInt"], serde_json::Value::Null);
    assert_eq!(json["result"]["aNullableString"], "s");
}

#[test]
fn call_reaches_other_api_groupings() {
    let server = Server::start("small");
    let output = Command::new(env!("CARGO_BIN_EXE_wirebridge"))
        .args(["--log-level", "error", "--format", "json", "call"])
        .arg(&server.sock)
        .args(["echo", "--args", r#"["small"]"#, "--api", "HostSmallApi"])
        .output()
        .expect("call should run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["result"], "small");
    assert_eq!(json["channel"], "wirebridge.HostSmallApi");
}

#[test]
fn remote_error_exits_4_with_code_on_stderr() {
    let server = Server::start("throw");
    let output = server.call("throwError", "[]");
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("code: message"), "stderr: {stderr}");
}

#[test]
fn unknown_method_exits_64() {
    let server = Server::start("unknown");
    let output = server.call("noSuchMethod", "[]");
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn missing_socket_exits_3() {
    let dir = unique_temp_dir("missing");
    let output = Command::new(env!("CARGO_BIN_EXE_wirebridge"))
        .args(["--log-level", "error", "call"])
        .arg(dir.join("absent.sock"))
        .arg("noop")
        .output()
        .expect("call should run");
    assert_eq!(output.status.code(), Some(3));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn bad_args_exit_64() {
    let output = Command::new(env!("CARGO_BIN_EXE_wirebridge"))
        .args(["call", "/tmp/unused.sock", "echoInt", "--args", "{\"x\":1}"])
        .output()
        .expect("call should run");
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn schema_lists_integration_types() {
    let output = Command::new(env!("CARGO_BIN_EXE_wirebridge"))
        .args(["--format", "json", "schema"])
        .output()
        .expect("schema should run");
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json output");
    assert!(json["schema_id"]
        .as_str()
        .unwrap_or_default()
        .ends_with("type-registry.schema.json"));
    let names: Vec<&str> = json["composites"]
        .as_array()
        .expect("composites array")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(
        names,
        [
            "AllTypes",
            "AllNullableTypes",
            "AllClassesWrapper",
            "AllNullableTypesWithoutRecursion",
            "TestMessage"
        ]
    );
}
