use crate::ReleaseNotesWorld;
use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use release_notes::github::search::API_URL_ENV;
use release_notes::notes::{OUTPUT_DIR, OUTPUT_FILENAME};
use release_notes::run::FETCH_ERROR_MESSAGE;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const EMPTY_SEARCH: &str = r#"{"total_count": 0, "incomplete_results": false, "items": []}"#;

fn docstring(step: &Step) -> String {
    step.docstring
        .as_ref()
        .expect("Expected docstring")
        .trim()
        .to_string()
}

/// Serves canned search responses, picking the body by the quoted label in the query.
async fn start_search_server(
    responses: Vec<(String, String)>,
    requests: Arc<Mutex<Vec<String>>>,
) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind search server");
    let addr = listener.local_addr().expect("Server address");

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };

            let mut raw = Vec::new();
            let mut chunk = [0u8; 1024];
            while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => raw.extend_from_slice(&chunk[..n]),
                }
            }

            let request = String::from_utf8_lossy(&raw);
            let target = request
                .lines()
                .next()
                .and_then(|line| line.split(' ').nth(1))
                .unwrap_or_default()
                .to_string();
            let query = target.replace("%22", "\"");

            let body = responses
                .iter()
                .find(|(label, _)| query.contains(&format!("label:\"{}\"", label.replace(' ', "+"))))
                .map(|(_, body)| body.as_str())
                .unwrap_or(EMPTY_SEARCH);
            requests.lock().unwrap().push(query);

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}/search/issues")
}

#[given("the config file content is:")]
async fn given_config_file_content(world: &mut ReleaseNotesWorld, step: &Step) {
    let content = docstring(step);
    let config_path = world.workdir().join("local_release_notes.cfg");
    std::fs::write(&config_path, content)
        .unwrap_or_else(|e| panic!("Failed to write config file {:?}: {}", config_path, e));
}

#[given("the config file does not exist")]
async fn given_config_file_does_not_exist(world: &mut ReleaseNotesWorld) {
    let config_path = world.workdir().join("local_release_notes.cfg");
    let _ = std::fs::remove_file(&config_path);
}

#[given(regex = r#"^the search API returns for label "(.*)":$"#)]
async fn given_search_returns(world: &mut ReleaseNotesWorld, label: String, step: &Step) {
    world.responses.push((label, docstring(step)));
}

#[given("the search API is unreachable")]
async fn given_search_unreachable(world: &mut ReleaseNotesWorld) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Probe address");
    drop(listener);
    world.api_url = Some(format!("http://{addr}/search/issues"));
}

#[given(regex = r#"^a notes file containing "(.*)"$"#)]
async fn given_notes_file(world: &mut ReleaseNotesWorld, content: String) {
    let dir = world.workdir().join(OUTPUT_DIR);
    std::fs::create_dir_all(&dir).expect("Failed to create output dir");
    std::fs::write(dir.join(OUTPUT_FILENAME), content).expect("Failed to write notes file");
}

#[when(regex = r"^I run `release-notes(.*)`$")]
async fn when_run_release_notes(world: &mut ReleaseNotesWorld, extra: String) {
    let api_url = match world.api_url.clone() {
        Some(url) => url,
        None => start_search_server(world.responses.clone(), world.requests.clone()).await,
    };
    let workdir = world.workdir().to_path_buf();

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_release-notes"))
        .args(extra.split_whitespace())
        .current_dir(&workdir)
        .env(API_URL_ENV, &api_url)
        .env_remove("RUST_LOG")
        .output()
        .await
        .expect("Failed to execute release-notes");

    world.captured_output = output.stdout;
    world.captured_error = output.stderr;
    world.command_status = Some(output.status);
}

#[then("the command should succeed")]
async fn then_command_succeeds(world: &mut ReleaseNotesWorld) {
    assert!(
        world.command_status.is_some_and(|s| s.success()),
        "Command failed with status: {:?}\nstderr:\n{}",
        world.command_status,
        String::from_utf8_lossy(&world.captured_error)
    );
}

#[then("the command should fail")]
async fn then_command_fails(world: &mut ReleaseNotesWorld) {
    assert!(
        world.command_status.is_some_and(|s| !s.success()),
        "Command should have failed but succeeded with status: {:?}",
        world.command_status
    );
}

#[then("the connectivity error message should be printed")]
async fn then_connectivity_error_printed(world: &mut ReleaseNotesWorld) {
    let output = String::from_utf8(world.captured_output.clone()).expect("Invalid UTF-8");
    assert_eq!(
        output.trim_end(),
        FETCH_ERROR_MESSAGE,
        "Expected output '{}', but got:\n---\n{}\n---",
        FETCH_ERROR_MESSAGE,
        output.trim_end()
    );

    let error = String::from_utf8_lossy(&world.captured_error);
    assert!(!error.contains("panicked"), "Unexpected panic:\n{}", error);
}

#[then(regex = r#"^the error output should contain "(.*)"$"#)]
async fn then_error_output_contains(world: &mut ReleaseNotesWorld, expected: String) {
    let error = String::from_utf8_lossy(&world.captured_error);
    assert!(
        error.contains(&expected),
        "Expected stderr to contain '{}', but got:\n---\n{}\n---",
        expected,
        error
    );
    assert!(!error.contains("panicked"), "Unexpected panic:\n{}", error);
}

#[then(regex = r"^the search API should have received (\d+) requests$")]
async fn then_request_count(world: &mut ReleaseNotesWorld, count: usize) {
    let requests = world.requests.lock().unwrap();
    assert_eq!(requests.len(), count, "Requests: {:?}", requests);
}

#[then(regex = r#"^request (\d+) should search label "(.*)"$"#)]
async fn then_request_label(world: &mut ReleaseNotesWorld, index: usize, label: String) {
    let requests = world.requests.lock().unwrap();
    let query = &requests[index - 1];
    assert!(
        query.contains("milestone:1.0.0+repo:org/proj+"),
        "Unexpected query: {}",
        query
    );
    assert!(
        query.ends_with(&format!("label:\"{}\"", label)),
        "Expected label '{}' in query: {}",
        label,
        query
    );
}

fn read_notes(world: &mut ReleaseNotesWorld) -> String {
    let path = world.workdir().join(OUTPUT_DIR).join(OUTPUT_FILENAME);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read notes file {:?}: {}", path, e))
}

#[then("the notes file should be:")]
async fn then_notes_file_should_be(world: &mut ReleaseNotesWorld, step: &Step) {
    let content = read_notes(world);
    let date_line = regex::Regex::new(r"(?m)^Date: \d{2} [A-Z][a-z]+ \d{4}$").unwrap();
    assert!(
        date_line.is_match(&content),
        "Date line not found in notes:\n{}",
        content
    );

    let normalized = date_line.replace(&content, "Date: <today>");
    assert_eq!(normalized.trim_end(), docstring(step));
}

#[then(regex = r#"^the notes file should not contain "(.*)"$"#)]
async fn then_notes_file_should_not_contain(world: &mut ReleaseNotesWorld, unexpected: String) {
    let content = read_notes(world);
    assert!(content.starts_with("# ver 1.0.0\nDate: "), "Notes:\n{}", content);
    assert!(
        !content.contains(&unexpected),
        "Notes should not contain '{}':\n{}",
        unexpected,
        content
    );
}

#[then("the notes file should not exist")]
async fn then_notes_file_should_not_exist(world: &mut ReleaseNotesWorld) {
    let path = world.workdir().join(OUTPUT_DIR).join(OUTPUT_FILENAME);
    assert!(!path.exists(), "Notes file should not exist: {:?}", path);
}
