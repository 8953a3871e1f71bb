//! Notice content for acknowledgments, reminders and leaderboards.

use crate::types::{Accent, LeaderboardEntry, Notice};

pub const LEADERBOARD_TITLE: &str = "DISBOARD BUMPS";
pub const LEADERBOARD_FOOTER: &str = "Keep bumping to climb the leaderboard!";
pub const LEADERBOARD_EMPTY: &str = "No bumps recorded yet.";
pub const LEADERBOARD_UNAVAILABLE: &str = "An error occurred while fetching the leaderboard.";

/// Chat mention syntax for a user id.
pub fn mention(user_id: &str) -> String {
    format!("<@{}>", user_id)
}

/// Sent right after a bump is recorded.
pub fn acknowledgment(user_id: &str) -> Notice {
    Notice::new(
        "Thank you for bumping!",
        format!(
            "Thank you, {}, for bumping the server! Your support is greatly appreciated!",
            mention(user_id)
        ),
        Accent::Thanks,
    )
}

/// Sent when a reminder comes due.
pub fn reminder(user_id: &str) -> Notice {
    Notice::new(
        "Friendly Reminder",
        format!(
            "Hey {}, don't forget to bump the server again! Your support helps us grow!",
            mention(user_id)
        ),
        Accent::Reminder,
    )
}

/// Ranked leaderboard, one line per entry starting at rank 1.
pub fn leaderboard(entries: &[LeaderboardEntry]) -> Notice {
    if entries.is_empty() {
        return Notice::new(LEADERBOARD_TITLE, LEADERBOARD_EMPTY, Accent::Leaderboard);
    }

    let body = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            // Plural even for a single bump
            format!("**{}.** {} - **{} bumps**", index + 1, entry.display_name, entry.count)
        })
        .collect::<Vec<_>>()
        .join("\n");

    Notice::new(LEADERBOARD_TITLE, body, Accent::Leaderboard).with_footer(LEADERBOARD_FOOTER)
}

/// Shown instead of the leaderboard when the store cannot be read.
pub fn leaderboard_unavailable() -> Notice {
    Notice::new(LEADERBOARD_TITLE, LEADERBOARD_UNAVAILABLE, Accent::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaderboard_lines() {
        let notice = leaderboard(&[
            LeaderboardEntry::new("Nova", 9),
            LeaderboardEntry::new("Kai", 1),
        ]);
        assert_eq!(notice.title, LEADERBOARD_TITLE);
        assert_eq!(notice.body, "**1.** Nova - **9 bumps**\n**2.** Kai - **1 bumps**");
        assert_eq!(notice.footer.as_deref(), Some(LEADERBOARD_FOOTER));
        assert_eq!(notice.accent, Accent::Leaderboard);
    }

    #[test]
    fn test_empty_leaderboard() {
        let notice = leaderboard(&[]);
        assert_eq!(notice.body, LEADERBOARD_EMPTY);
        assert!(notice.footer.is_none());
    }

    #[test]
    fn test_acknowledgment_and_reminder_mention_user() {
        assert!(acknowledgment("U42").body.contains("<@U42>"));
        let r = reminder("U42");
        assert_eq!(r.title, "Friendly Reminder");
        assert!(r.body.starts_with("Hey <@U42>"));
        assert_eq!(r.accent.rgb(), 0xff9900);
    }
}
