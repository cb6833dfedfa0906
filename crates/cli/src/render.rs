use jokebox_common::{
    admin::{ModerationLog, UserStats, UsersTable},
    comment::Comment,
    joke::Joke,
    social::{ReactionEntry, SocialAggregate},
};
use log::warn;
use std::fmt::Write;

/// Converts a rich text body to terminal text. Wrapping is left to the terminal.
fn plain_text(html: &str) -> String {
    match html2text::from_read(html.as_bytes(), usize::MAX) {
        Ok(text) => text.trim_end().to_string(),
        Err(e) => {
            warn!("Failed to convert html body: {e}");
            html.to_string()
        }
    }
}

pub fn reactions(entries: &[ReactionEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            let marker = if e.active { "*" } else { "" };
            format!("{}{} {}", e.emoji, marker, e.count)
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn social_line(social: &SocialAggregate) -> String {
    let reactions = reactions(&social.reaction_display());
    if reactions.is_empty() {
        format!("[{:+}]", social.score())
    } else {
        format!("[{:+}] {reactions}", social.score())
    }
}

pub fn joke(joke: &Joke) -> String {
    let mut out = format!(
        "#{} by {} at {}  {}  ({} comments)\n",
        joke.id,
        joke.author_username,
        joke.created_at.format("%Y-%m-%d %H:%M"),
        social_line(&joke.social),
        joke.comment_count
    );
    if !joke.title.is_empty() {
        let _ = writeln!(out, "  {}", joke.title);
    }
    for line in plain_text(&joke.body).lines() {
        let _ = writeln!(out, "  {line}");
    }
    out
}

/// Renders an already nested comment tree, replies indented below their parent.
pub fn comment_tree(tree: &[Comment]) -> String {
    let mut out = String::new();
    for comment in tree {
        write_comment(&mut out, comment, 0);
    }
    out
}

fn write_comment(out: &mut String, comment: &Comment, depth: usize) {
    let indent = "  ".repeat(depth);
    let id = if comment.id.is_transient() {
        "pending".to_string()
    } else {
        comment.id.to_string()
    };
    let body = plain_text(comment.display_body());
    let mut lines = body.lines();
    let _ = writeln!(
        out,
        "{indent}- [{id}] {}: {}  {}",
        comment.author_username,
        lines.next().unwrap_or_default(),
        social_line(&comment.social)
    );
    for line in lines {
        let _ = writeln!(out, "{indent}  {line}");
    }
    for child in &comment.children {
        write_comment(out, child, depth + 1);
    }
}

pub fn users(table: &UsersTable) -> String {
    let mut out = String::new();
    for user in &table.users {
        let role = if user.is_admin { "admin" } else { "user" };
        let _ = writeln!(
            out,
            "{:>5}  {:<20} {:<30} {role}",
            user.id, user.username, user.email
        );
    }
    let total = table
        .pager
        .total_pages()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".to_string());
    let _ = writeln!(out, "page {} of {total}", table.pager.page());
    out
}

pub fn logs(logs: &[ModerationLog]) -> String {
    if logs.is_empty() {
        return "No moderation logs\n".to_string();
    }
    let mut out = String::new();
    for log in logs {
        let _ = writeln!(
            out,
            "{}  {} {} {} #{} {}",
            log.created_at.format("%Y-%m-%d %H:%M"),
            log.admin_username,
            log.action,
            log.target_type,
            log.target_id,
            log.details
        );
    }
    out
}

pub fn stats(stats: &UserStats) -> String {
    let mut out = format!(
        "users: {}  admins: {}\nnew today: {}  this week: {}  this month: {}\n",
        stats.total_users,
        stats.admin_count,
        stats.new_users_today,
        stats.new_users_this_week,
        stats.new_users_this_month
    );
    for user in &stats.most_active_users {
        let _ = writeln!(
            out,
            "  {:<20} {} jokes, {} comments, {} total",
            user.username,
            user.jokes_count,
            user.comments_count,
            user.total_activity()
        );
    }
    out
}
