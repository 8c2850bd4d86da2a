use super::types::{UserRecord, WhitelistDocument, WhitelistStats};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static TELEGRAM_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+$").expect("telegram id pattern is valid")
});

/// One or more ASCII digits, nothing else.
pub fn is_valid_telegram_id(telegram_id: &str) -> bool {
    TELEGRAM_ID.is_match(telegram_id)
}

// Finds the first active record for the id and stamps its last login.
// The caller is responsible for persisting the document.
pub fn verify(
    doc: &mut WhitelistDocument,
    telegram_id: &str,
    now: DateTime<Utc>,
) -> Option<UserRecord> {
    let user = doc
        .users
        .iter_mut()
        .find(|user| user.telegram_id == telegram_id && user.is_active)?;
    user.last_login = Some(now);
    Some(user.clone())
}

// Adds a new record or reactivates the first existing one with this id.
// Empty display strings never overwrite stored ones.
pub fn upsert(
    doc: &mut WhitelistDocument,
    telegram_id: &str,
    username: &str,
    first_name: &str,
    now: DateTime<Utc>,
) -> UserRecord {
    if let Some(user) = doc
        .users
        .iter_mut()
        .find(|user| user.telegram_id == telegram_id)
    {
        user.is_active = true;
        if !username.is_empty() {
            user.username = username.to_string();
        }
        if !first_name.is_empty() {
            user.first_name = first_name.to_string();
        }
        user.updated_at = Some(now);
        return user.clone();
    }

    let user = UserRecord::new(telegram_id, username, first_name, now);
    doc.users.push(user.clone());
    user
}

/// Soft-deletes the first record with this id. Returns whether one was found.
pub fn deactivate(doc: &mut WhitelistDocument, telegram_id: &str) -> bool {
    match doc
        .users
        .iter_mut()
        .find(|user| user.telegram_id == telegram_id)
    {
        Some(user) => {
            user.is_active = false;
            true
        }
        None => false,
    }
}

pub fn stats(doc: &WhitelistDocument) -> WhitelistStats {
    WhitelistStats {
        total_users: doc.users.len(),
        active_users: doc.users.iter().filter(|user| user.is_active).count(),
        last_updated: doc.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn document_with(users: &[(&str, bool)]) -> WhitelistDocument {
        let now = Utc::now();
        let mut doc = WhitelistDocument::new(now);
        for (id, active) in users {
            let mut user = UserRecord::new(id, "", "", now);
            user.is_active = *active;
            doc.users.push(user);
        }
        doc
    }

    #[test]
    fn test_telegram_id_validation() {
        assert!(is_valid_telegram_id("123456789"));
        assert!(is_valid_telegram_id("0"));

        assert!(!is_valid_telegram_id(""));
        assert!(!is_valid_telegram_id("12a4"));
        assert!(!is_valid_telegram_id("+123"));
        assert!(!is_valid_telegram_id("-123"));
        assert!(!is_valid_telegram_id(" 123"));
        assert!(!is_valid_telegram_id("123\n"));
        // Non-ASCII digits are rejected
        assert!(!is_valid_telegram_id("١٢٣"));
    }

    #[test]
    fn test_verify_active_user_updates_last_login() {
        let mut doc = document_with(&[("100", true)]);
        let now = Utc::now() + Duration::seconds(5);

        let user = verify(&mut doc, "100", now).unwrap();

        assert_eq!(user.last_login, Some(now));
        assert_eq!(doc.users[0].last_login, Some(now));
    }

    #[test]
    fn test_verify_unknown_or_inactive_user_is_denied() {
        let mut doc = document_with(&[("100", false)]);
        let before = doc.clone();

        assert!(verify(&mut doc, "100", Utc::now()).is_none());
        assert!(verify(&mut doc, "200", Utc::now()).is_none());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_verify_skips_inactive_duplicate() {
        let mut doc = document_with(&[("100", false), ("100", true)]);

        assert!(verify(&mut doc, "100", Utc::now()).is_some());
        assert!(doc.users[0].last_login.is_none());
        assert!(doc.users[1].last_login.is_some());
    }

    #[test]
    fn test_upsert_appends_new_user() {
        let mut doc = document_with(&[]);
        let now = Utc::now();

        let user = upsert(&mut doc, "555", "carol", "Carol", now);

        assert_eq!(doc.users.len(), 1);
        assert!(user.is_active);
        assert_eq!(user.last_login, None);
        assert_eq!(user.joined_at, now);
        assert_eq!(doc.users[0], user);
    }

    #[test]
    fn test_upsert_reactivates_and_preserves_names() {
        let mut doc = document_with(&[]);
        let joined = Utc::now();
        upsert(&mut doc, "555", "carol", "Carol", joined);
        deactivate(&mut doc, "555");

        let later = joined + Duration::minutes(1);
        let user = upsert(&mut doc, "555", "", "Caroline", later);

        assert_eq!(doc.users.len(), 1);
        assert!(user.is_active);
        assert_eq!(user.username, "carol");
        assert_eq!(user.first_name, "Caroline");
        assert_eq!(user.joined_at, joined);
        assert_eq!(user.updated_at, Some(later));
    }

    #[test]
    fn test_deactivate() {
        let mut doc = document_with(&[("1", true), ("2", true)]);

        assert!(deactivate(&mut doc, "1"));
        assert!(!doc.users[0].is_active);
        assert!(doc.users[1].is_active);
        assert_eq!(doc.users.len(), 2);

        let before = doc.clone();
        assert!(!deactivate(&mut doc, "3"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_stats_counts_active_users() {
        let doc = document_with(&[("1", true), ("2", false), ("3", true)]);
        let stats = stats(&doc);

        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.active_users, 2);
        assert_eq!(stats.last_updated, doc.updated_at);
    }
}
