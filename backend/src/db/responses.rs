use crate::db::json_column_error;
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use common::model::dashboard::{LatestAnswer, SurveyRef};
use common::model::response::{Answer, SurveyResponse};
use rusqlite::{params, Connection, Row};

fn response_from_row(row: &Row<'_>) -> rusqlite::Result<SurveyResponse> {
    let answers = serde_json::from_str(&row.get::<_, String>(3)?)
        .map_err(|e| json_column_error(3, e))?;
    Ok(SurveyResponse {
        id: row.get(0)?,
        survey_id: row.get(1)?,
        participant_email: row.get(2)?,
        answers,
        submitted_at: row.get(4)?,
    })
}

/// Stores a submission verbatim; answers are kept as a JSON array.
pub fn insert_response(
    conn: &Connection,
    survey_id: i64,
    participant_email: Option<&str>,
    answers: Vec<Answer>,
    submitted_at: DateTime<Utc>,
) -> Result<SurveyResponse, ApiError> {
    conn.execute(
        "INSERT INTO survey_results (survey_id, participant_email, answers, submitted_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            survey_id,
            participant_email,
            serde_json::to_string(&answers)?,
            submitted_at
        ],
    )?;
    Ok(SurveyResponse {
        id: conn.last_insert_rowid(),
        survey_id,
        participant_email: participant_email.map(str::to_string),
        answers,
        submitted_at,
    })
}

/// All responses of a survey, most recent submission first.
pub fn responses_for_survey(
    conn: &Connection,
    survey_id: i64,
) -> rusqlite::Result<Vec<SurveyResponse>> {
    conn.prepare(
        "SELECT id, survey_id, participant_email, answers, submitted_at FROM survey_results
         WHERE survey_id = ?1 ORDER BY submitted_at DESC, id DESC",
    )?
    .query_map(params![survey_id], response_from_row)?
    .collect()
}

/// Number of responses across every survey owned by `user_id`.
pub fn count_for_owner(conn: &Connection, user_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM survey_results r JOIN surveys s ON s.id = r.survey_id
         WHERE s.user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

pub fn latest_for_owner(
    conn: &Connection,
    user_id: i64,
    limit: i64,
) -> rusqlite::Result<Vec<LatestAnswer>> {
    conn.prepare(
        "SELECT r.id, s.id, s.title, r.submitted_at
         FROM survey_results r JOIN surveys s ON s.id = r.survey_id
         WHERE s.user_id = ?1
         ORDER BY r.submitted_at DESC, r.id DESC LIMIT ?2",
    )?
    .query_map(params![user_id, limit], |row| {
        Ok(LatestAnswer {
            id: row.get(0)?,
            survey: SurveyRef {
                id: row.get(1)?,
                title: row.get(2)?,
            },
            submitted_at: row.get(3)?,
        })
    })?
    .collect()
}
