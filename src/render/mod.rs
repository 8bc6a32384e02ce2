//! # HTML Rendering
//!
//! Maps transcript entries to HTML markup. Two entry points:
//!
//! - [`render_message`]: one entry, branching on its role
//! - [`render_page`]: a standalone document (header + message list), used by
//!   `--export-html`
//!
//! Model and user content goes through [`markdown::to_html`], which escapes
//! any raw HTML. Error content is never parsed as Markdown, only escaped.

pub mod markdown;

use std::fs;
use std::io;
use std::path::Path;

use log::info;

use crate::core::transcript::{Message, Role, Transcript};
use markdown::escaped;

pub const PAGE_TITLE: &str = "Dev Assistant Chatbot";

/// Render a single transcript entry.
pub fn render_message(message: &Message) -> String {
    match message.role {
        Role::Error => format!(
            concat!(
                r#"<div class="message message-error flex justify-center items-center my-4">"#,
                r#"<div class="px-4 py-2 rounded-lg bg-red-500/30 text-red-300 border border-red-500/50" role="alert">"#,
                "<p>Error: {}</p></div></div>"
            ),
            escaped(&message.content)
        ),
        Role::User | Role::Model => {
            let bubble = format!(
                concat!(
                    r#"<div class="bubble max-w-2xl w-full px-5 py-3 rounded-2xl {}">"#,
                    r#"<div class="prose prose-invert prose-sm max-w-none">{}</div></div>"#
                ),
                bubble_class(message.role),
                markdown::to_html(&message.content)
            );
            // Model avatar sits left of its bubble, user avatar right of theirs.
            let (before, after) = match message.role {
                Role::Model => (avatar(Role::Model), String::new()),
                _ => (String::new(), avatar(Role::User)),
            };
            format!(
                r#"<div class="message message-{} flex items-start gap-4 my-4 {}">{}{}{}</div>"#,
                message.role.label(),
                alignment_class(message.role),
                before,
                bubble,
                after
            )
        }
    }
}

fn bubble_class(role: Role) -> &'static str {
    match role {
        Role::User => "bg-blue-600/30",
        Role::Model | Role::Error => "bg-gray-700/30",
    }
}

fn alignment_class(role: Role) -> &'static str {
    match role {
        Role::User => "justify-end",
        Role::Model | Role::Error => "justify-start",
    }
}

fn avatar(role: Role) -> String {
    let (class, label, glyph) = match role {
        Role::User => ("avatar-user text-blue-400", "User", "\u{1F464}"),
        Role::Model | Role::Error => ("avatar-model text-gray-400", "Assistant", "\u{1F916}"),
    };
    format!(
        r#"<span class="avatar {class} w-8 h-8 flex-shrink-0 mt-1" role="img" aria-label="{label}">{glyph}</span>"#
    )
}

/// Render the whole transcript as a standalone HTML document.
pub fn render_page(title: &str, model_name: &str, transcript: &Transcript) -> String {
    let messages: String = transcript.iter().map(render_message).collect();
    let title = escaped(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body class="flex flex-col h-screen bg-gray-900 text-gray-100 font-sans">
<header class="p-4 text-center border-b border-gray-700"><h1 class="text-xl font-bold">{title}</h1></header>
<main class="flex-1 overflow-y-auto p-4"><div class="messages max-w-4xl mx-auto">{messages}</div></main>
<footer class="p-4 text-center text-gray-400 border-t border-gray-700">Model: {model}</footer>
</body>
</html>
"#,
        model = escaped(model_name),
    )
}

/// Write the rendered page to `path`.
pub fn export_html(path: &Path, model_name: &str, transcript: &Transcript) -> io::Result<()> {
    fs::write(path, render_page(PAGE_TITLE, model_name, transcript))?;
    info!(
        "Exported {} messages to {}",
        transcript.len(),
        path.display()
    );
    Ok(())
}
