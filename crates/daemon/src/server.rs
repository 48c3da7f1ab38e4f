//! Line-delimited command loop.
//!
//! Reads one JSON command per line, hands it to the state container and
//! writes one JSON response per line. Bad input gets an `error` response and
//! the loop keeps going; `stop` or end of input ends it.
//!
//! `browse_app` is answered at once with an `info` line. The picker result
//! arrives later as its own line, and commands keep being served while the
//! dialog is open.

use crate::state::{AppState, BrowseOutcome, PendingBrowse};
use anyhow::Result;
use instadesk_ipc::{decode_command, encode_response, IpcCommand, IpcResponse, MAX_IPC_MESSAGE_SIZE};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Lines read ahead of the command loop.
const INPUT_QUEUE: usize = 32;

/// One read from the input stream.
#[derive(Debug, PartialEq, Eq)]
enum Incoming {
    Line(String),
    /// A line longer than the limit, already discarded.
    TooLarge,
    Eof,
}

/// Read the next line, never buffering more than the message limit.
async fn read_message<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<Incoming> {
    let limit = MAX_IPC_MESSAGE_SIZE as u64 + 1;
    let mut buf = Vec::new();
    let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(Incoming::Eof);
    }
    if buf.last() != Some(&b'\n') && buf.len() as u64 >= limit {
        skip_rest_of_line(reader).await?;
        return Ok(Incoming::TooLarge);
    }
    Ok(Incoming::Line(String::from_utf8_lossy(&buf).into_owned()))
}

async fn skip_rest_of_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<()> {
    loop {
        let (consumed, done) = {
            let buf = reader.fill_buf().await?;
            if buf.is_empty() {
                return Ok(());
            }
            match buf.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (buf.len(), false),
            }
        };
        reader.consume(consumed);
        if done {
            return Ok(());
        }
    }
}

/// Forward input lines to the loop until end of input or a read error.
async fn read_lines<R>(mut reader: R, tx: mpsc::Sender<std::io::Result<Incoming>>)
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let message = read_message(&mut reader).await;
        let last = !matches!(message, Ok(Incoming::Line(_)) | Ok(Incoming::TooLarge));
        if tx.send(message).await.is_err() || last {
            return;
        }
    }
}

/// Wait for the open dialog, or forever when there is none.
async fn browse_finished(pending: &mut Option<PendingBrowse>) -> BrowseOutcome {
    match pending {
        Some(pick) => pick.await,
        None => std::future::pending().await,
    }
}

async fn respond<W: AsyncWrite + Unpin>(writer: &mut W, response: &IpcResponse) -> Result<()> {
    writer.write_all(encode_response(response).as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Serve commands until `stop` or end of input.
///
/// An open picker dialog is abandoned when the loop ends.
pub async fn run<R, W>(state: &mut AppState, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let (tx, mut lines) = mpsc::channel(INPUT_QUEUE);
    let reader_task = tokio::spawn(read_lines(reader, tx));
    let result = serve(state, &mut lines, &mut writer).await;
    reader_task.abort();
    result
}

async fn serve<W: AsyncWrite + Unpin>(
    state: &mut AppState,
    lines: &mut mpsc::Receiver<std::io::Result<Incoming>>,
    writer: &mut W,
) -> Result<()> {
    let mut browsing: Option<PendingBrowse> = None;

    loop {
        tokio::select! {
            biased;

            outcome = browse_finished(&mut browsing) => {
                browsing = None;
                let response = state.finish_browse(outcome);
                respond(writer, &response).await?;
            }

            incoming = lines.recv() => {
                let line = match incoming {
                    None | Some(Ok(Incoming::Eof)) => {
                        info!("Input closed, shutting down");
                        return Ok(());
                    }
                    Some(Err(e)) => return Err(e.into()),
                    Some(Ok(Incoming::TooLarge)) => {
                        warn!("Dropped message larger than {} bytes", MAX_IPC_MESSAGE_SIZE);
                        let message =
                            format!("Message too large (max {} bytes)", MAX_IPC_MESSAGE_SIZE);
                        respond(writer, &IpcResponse::error(message)).await?;
                        continue;
                    }
                    Some(Ok(Incoming::Line(line))) => line,
                };

                if line.trim().is_empty() {
                    continue;
                }
                debug!("Received command: {}", line.trim());

                let cmd = match decode_command(&line) {
                    Ok(cmd) => cmd,
                    Err(e) => {
                        respond(writer, &IpcResponse::error(e.to_string())).await?;
                        continue;
                    }
                };

                let is_stop = matches!(cmd, IpcCommand::Stop);
                let response = state.handle_command(cmd);
                respond(writer, &response).await?;
                if let Some(pending) = state.take_pending_browse() {
                    browsing = Some(pending);
                }

                if is_stop {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::picker::{PathPicker, PickFuture, PickRequest, UnavailablePicker};
    use crate::state::{PICKER_OPENED_MESSAGE, PICKER_UNAVAILABLE_MESSAGE};
    use instadesk_storage::KeyValueStore;
    use std::io::Cursor;
    use std::time::Duration;

    /// Picker whose dialog never closes.
    struct OpenDialogPicker;

    impl PathPicker for OpenDialogPicker {
        fn is_available(&self) -> bool {
            true
        }

        fn pick<'a>(&'a self, _request: &'a PickRequest) -> PickFuture<'a> {
            Box::pin(std::future::pending())
        }
    }

    /// Picker that immediately returns a fixed path.
    struct ChosenPathPicker(&'static str);

    impl PathPicker for ChosenPathPicker {
        fn is_available(&self) -> bool {
            true
        }

        fn pick<'a>(&'a self, _request: &'a PickRequest) -> PickFuture<'a> {
            let path = self.0.to_string();
            Box::pin(async move { Ok(Some(path)) })
        }
    }

    fn state_with(picker: Box<dyn PathPicker>) -> AppState {
        AppState::new_with_config(&Config::default(), KeyValueStore::in_memory(), picker)
    }

    fn test_state() -> AppState {
        state_with(Box::new(UnavailablePicker))
    }

    async fn run_script(state: &mut AppState, input: &str) -> Vec<IpcResponse> {
        let mut output = Vec::new();
        let reader = Cursor::new(input.as_bytes().to_vec());
        run(state, reader, &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_run_processes_each_line() {
        let mut state = test_state();
        let input = concat!(
            "{\"type\":\"begin_drag\",\"row\":1,\"col\":1}\n",
            "{\"type\":\"update_drag\",\"row\":2,\"col\":2}\n",
            "{\"type\":\"end_drag\"}\n",
            "{\"type\":\"set_selected_app\",\"app\":\"Chrome\"}\n",
            "{\"type\":\"assign_selected\"}\n",
        );
        let responses = run_script(&mut state, input).await;
        assert_eq!(responses.len(), 5);
        assert!(responses.iter().all(|r| *r == IpcResponse::Ok));
        assert_eq!(state.engine().assignments().assigned_count(), 4);
    }

    #[tokio::test]
    async fn test_run_survives_bad_input() {
        let mut state = test_state();
        let input = "not json\n\n{\"type\":\"nope\"}\n{\"type\":\"query_grid\"}";
        let responses = run_script(&mut state, input).await;
        assert_eq!(responses.len(), 3);
        assert!(matches!(responses[0], IpcResponse::Error { .. }));
        assert!(matches!(responses[1], IpcResponse::Error { .. }));
        assert!(matches!(responses[2], IpcResponse::GridState { .. }));
    }

    #[tokio::test]
    async fn test_run_stops_on_stop() {
        let mut state = test_state();
        let input = "{\"type\":\"stop\"}\n{\"type\":\"clear_grid\"}\n";
        let responses = run_script(&mut state, input).await;
        assert_eq!(responses, vec![IpcResponse::Ok]);
    }

    #[tokio::test]
    async fn test_run_rejects_oversized_line() {
        let mut state = test_state();
        let input = format!(
            "{{\"type\":\"add_browser\",\"name\":\"{}\"}}\n{{\"type\":\"copy_grid\"}}\n",
            "x".repeat(MAX_IPC_MESSAGE_SIZE + 10)
        );
        let responses = run_script(&mut state, &input).await;
        assert_eq!(responses.len(), 2);
        assert!(matches!(responses[0], IpcResponse::Error { .. }));
        assert_eq!(responses[1], IpcResponse::Ok);
        assert!(state.engine().clipboard().is_some());
    }

    #[tokio::test]
    async fn test_run_serves_commands_while_picker_open() {
        let mut state = state_with(Box::new(OpenDialogPicker));
        let input = concat!(
            "{\"type\":\"browse_app\"}\n",
            "{\"type\":\"query_grid\"}\n",
            "{\"type\":\"clear_grid\"}\n",
        );
        let responses = tokio::time::timeout(Duration::from_secs(5), run_script(&mut state, input))
            .await
            .expect("command loop blocked while the picker was open");
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0], IpcResponse::info(PICKER_OPENED_MESSAGE));
        assert!(matches!(responses[1], IpcResponse::GridState { .. }));
        assert_eq!(responses[2], IpcResponse::Ok);
        assert!(state.history().is_empty());
    }

    #[tokio::test]
    async fn test_run_writes_picker_result_as_own_line() {
        let mut state = state_with(Box::new(ChosenPathPicker(r"C:\Tools\zed.exe")));
        let input = concat!(
            "{\"type\":\"browse_app\"}\n",
            "{\"type\":\"list_history\"}\n",
        );
        let responses = run_script(&mut state, input).await;
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0], IpcResponse::info(PICKER_OPENED_MESSAGE));
        match &responses[1] {
            IpcResponse::HistoryItem { item } => assert_eq!(item.title, "zed"),
            other => panic!("Expected HistoryItem, got {:?}", other),
        }
        match &responses[2] {
            IpcResponse::History { items } => assert_eq!(items.len(), 1),
            other => panic!("Expected History, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_browse_without_picker() {
        let mut state = test_state();
        let responses = run_script(&mut state, "{\"type\":\"browse_app\"}\n").await;
        assert_eq!(responses, vec![IpcResponse::info(PICKER_UNAVAILABLE_MESSAGE)]);
    }

    #[tokio::test]
    async fn test_read_message_without_trailing_newline() {
        let mut reader: &[u8] = b"{\"type\":\"stop\"}";
        assert_eq!(
            read_message(&mut reader).await.unwrap(),
            Incoming::Line("{\"type\":\"stop\"}".to_string())
        );
        assert_eq!(read_message(&mut reader).await.unwrap(), Incoming::Eof);
    }
}
