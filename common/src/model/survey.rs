use crate::model::question::Question;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A survey together with its ordered questions.
///
/// `slug` is the public identifier used in shareable links; it is assigned on
/// creation and never changes afterwards. List endpoints return surveys with
/// an empty `questions` vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub slug: String,
    /// `true` when active, `false` while still a draft.
    pub status: bool,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// `None` means the survey never expires.
    pub expire_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Whether a survey currently accepts submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Open,
    Inactive,
    Expired,
}

impl Survey {
    /// A survey is open while it is active and `now` has not passed its expiry.
    /// The draft check wins when both conditions fail.
    pub fn availability(&self, now: DateTime<Utc>) -> Availability {
        if !self.status {
            return Availability::Inactive;
        }
        match self.expire_date {
            Some(expire_date) if now > expire_date => Availability::Expired,
            _ => Availability::Open,
        }
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn survey(status: bool, expire_date: Option<DateTime<Utc>>) -> Survey {
        let now = Utc::now();
        Survey {
            id: 1,
            user_id: 1,
            title: "Team lunch".to_string(),
            slug: "team-lunch".to_string(),
            status,
            description: None,
            image_url: None,
            expire_date,
            created_at: now,
            updated_at: now,
            questions: Vec::new(),
        }
    }

    #[test]
    fn draft_survey_is_inactive_even_when_expired() {
        let now = Utc::now();
        let s = survey(false, Some(now - Duration::days(1)));
        assert_eq!(s.availability(now), Availability::Inactive);
    }

    #[test]
    fn expiry_is_inclusive() {
        let now = Utc::now();
        assert_eq!(survey(true, Some(now)).availability(now), Availability::Open);
        assert_eq!(
            survey(true, Some(now - Duration::seconds(1))).availability(now),
            Availability::Expired
        );
        assert_eq!(survey(true, None).availability(now), Availability::Open);
    }
}
