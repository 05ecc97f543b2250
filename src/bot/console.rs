// src/bot/console.rs
// Line-based transport for local use: one message per line, replies printed

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::{CommandHandler, Reply};

pub async fn run<R, W>(handler: &CommandHandler, user_id: &str, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if matches!(line.trim(), "/quit" | "/exit") {
            break;
        }

        let rendered = match handler.handle(user_id, &line).await {
            Some(reply) => render(&reply),
            None => "(ignored)".to_string(),
        };
        output.write_all(rendered.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}

fn render(reply: &Reply) -> String {
    let mut out = String::new();
    if let Some(url) = &reply.photo_url {
        out.push_str(&format!("[photo] {}", url));
    }
    if !reply.text.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&reply.text);
    }
    for button in &reply.buttons {
        out.push_str(&format!("\n  [{}] -> {}", button.label, button.callback_data));
    }
    out
}
