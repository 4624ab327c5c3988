use crate::db::json_column_error;
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use common::model::dashboard::LatestSurvey;
use common::model::question::{Question, QuestionKind, QuestionType};
use common::model::survey::Survey;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashSet;

/// Validated survey fields ready to be written.
#[derive(Debug, Clone)]
pub struct SurveyDraft {
    pub title: String,
    pub status: bool,
    pub description: Option<String>,
    pub expire_date: Option<DateTime<Utc>>,
    pub questions: Vec<QuestionDraft>,
}

#[derive(Debug, Clone)]
pub struct QuestionDraft {
    /// Existing question to update; `None` inserts a new one.
    pub id: Option<i64>,
    pub question: String,
    pub description: Option<String>,
    pub kind: QuestionKind,
}

const SURVEY_COLUMNS: &str =
    "id, user_id, title, slug, status, description, image_url, expire_date, created_at, updated_at";

fn survey_from_row(row: &Row<'_>) -> rusqlite::Result<Survey> {
    Ok(Survey {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        slug: row.get(3)?,
        status: row.get(4)?,
        description: row.get(5)?,
        image_url: row.get(6)?,
        expire_date: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        questions: Vec::new(),
    })
}

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    let question_type: QuestionType = row
        .get::<_, String>(2)?
        .parse()
        .map_err(|e| json_column_error(2, e))?;
    let options = serde_json::from_str(&row.get::<_, String>(5)?)
        .map_err(|e| json_column_error(5, e))?;

    Ok(Question {
        id: row.get(0)?,
        survey_id: row.get(1)?,
        question: row.get(3)?,
        description: row.get(4)?,
        kind: QuestionKind::new(question_type, options),
    })
}

pub fn slug_exists(conn: &Connection, slug: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM surveys WHERE slug = ?1)",
        params![slug],
        |row| row.get(0),
    )
}

/// First of `base`, `base-2`, `base-3`, ... not used by any survey.
fn free_slug(conn: &Connection, base: &str) -> rusqlite::Result<String> {
    let mut candidate = base.to_string();
    let mut suffix = 1;
    while slug_exists(conn, &candidate)? {
        suffix += 1;
        candidate = format!("{base}-{suffix}");
    }
    Ok(candidate)
}

/// Inserts a survey and its questions and returns its id.
///
/// The slug is derived from `base_slug` inside the same immediate
/// transaction, so concurrent inserts of the same title serialize on the
/// write lock instead of racing for one slug.
pub fn insert_survey(
    conn: &mut Connection,
    user_id: i64,
    base_slug: &str,
    image_url: Option<&str>,
    draft: &SurveyDraft,
    now: DateTime<Utc>,
) -> Result<i64, ApiError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let slug = free_slug(&tx, base_slug)?;
    tx.execute(
        "INSERT INTO surveys (user_id, title, slug, status, description, image_url, expire_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            user_id,
            &draft.title,
            &slug,
            draft.status,
            &draft.description,
            image_url,
            draft.expire_date,
            now
        ],
    )?;
    let survey_id = tx.last_insert_rowid();
    sync_questions(&tx, survey_id, &draft.questions)?;
    tx.commit()?;
    Ok(survey_id)
}

/// Updates a survey's editable fields and synchronizes its questions. The slug is left alone.
pub fn update_survey(
    conn: &mut Connection,
    survey_id: i64,
    image_url: Option<&str>,
    draft: &SurveyDraft,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE surveys SET title = ?1, status = ?2, description = ?3, image_url = ?4, expire_date = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            &draft.title,
            draft.status,
            &draft.description,
            image_url,
            draft.expire_date,
            now,
            survey_id
        ],
    )?;
    sync_questions(&tx, survey_id, &draft.questions)?;
    tx.commit()?;
    Ok(())
}

/// Makes the stored questions of `survey_id` match `questions`.
///
/// Drafts whose id belongs to the survey update that row, the rest are
/// inserted, and stored questions absent from the drafts are deleted.
/// Positions follow the draft order.
fn sync_questions(
    tx: &Transaction<'_>,
    survey_id: i64,
    questions: &[QuestionDraft],
) -> Result<(), ApiError> {
    let existing: HashSet<i64> = tx
        .prepare("SELECT id FROM survey_questions WHERE survey_id = ?1")?
        .query_map(params![survey_id], |row| row.get(0))?
        .collect::<rusqlite::Result<_>>()?;

    let kept: HashSet<i64> = questions
        .iter()
        .filter_map(|q| q.id)
        .filter(|id| existing.contains(id))
        .collect();

    for old_id in existing.difference(&kept) {
        tx.execute(
            "DELETE FROM survey_questions WHERE id = ?1 AND survey_id = ?2",
            params![old_id, survey_id],
        )?;
    }

    for (position, draft) in questions.iter().enumerate() {
        let options = serde_json::to_string(draft.kind.options())?;
        let question_type = draft.kind.question_type().as_str();
        match draft.id.filter(|id| kept.contains(id)) {
            Some(id) => {
                tx.execute(
                    "UPDATE survey_questions SET position = ?1, type = ?2, question = ?3, description = ?4, options = ?5
                     WHERE id = ?6",
                    params![position as i64, question_type, &draft.question, &draft.description, options, id],
                )?;
            }
            None => {
                tx.execute(
                    "INSERT INTO survey_questions (survey_id, position, type, question, description, options)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![survey_id, position as i64, question_type, &draft.question, &draft.description, options],
                )?;
            }
        }
    }
    Ok(())
}

pub fn load_questions(conn: &Connection, survey_id: i64) -> rusqlite::Result<Vec<Question>> {
    conn.prepare(
        "SELECT id, survey_id, type, question, description, options FROM survey_questions
         WHERE survey_id = ?1 ORDER BY position, id",
    )?
    .query_map(params![survey_id], question_from_row)?
    .collect()
}

/// The survey with its questions.
pub fn find_survey(conn: &Connection, survey_id: i64) -> rusqlite::Result<Option<Survey>> {
    let survey = conn
        .query_row(
            &format!("SELECT {SURVEY_COLUMNS} FROM surveys WHERE id = ?1"),
            params![survey_id],
            survey_from_row,
        )
        .optional()?;
    with_questions(conn, survey)
}

pub fn find_survey_by_slug(conn: &Connection, slug: &str) -> rusqlite::Result<Option<Survey>> {
    let survey = conn
        .query_row(
            &format!("SELECT {SURVEY_COLUMNS} FROM surveys WHERE slug = ?1"),
            params![slug],
            survey_from_row,
        )
        .optional()?;
    with_questions(conn, survey)
}

fn with_questions(conn: &Connection, survey: Option<Survey>) -> rusqlite::Result<Option<Survey>> {
    match survey {
        Some(mut survey) => {
            survey.questions = load_questions(conn, survey.id)?;
            Ok(Some(survey))
        }
        None => Ok(None),
    }
}

/// Surveys owned by `user_id`, newest first, without questions.
pub fn list_surveys(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Survey>> {
    conn.prepare(&format!(
        "SELECT {SURVEY_COLUMNS} FROM surveys WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
    ))?
    .query_map(params![user_id], survey_from_row)?
    .collect()
}

/// Deletes the survey; questions and responses go with it.
pub fn delete_survey(conn: &Connection, survey_id: i64) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM surveys WHERE id = ?1", params![survey_id])?;
    Ok(())
}

pub fn count_surveys(conn: &Connection, user_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM surveys WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

/// The most recently created survey of `user_id` with its question and response counts.
pub fn latest_survey(conn: &Connection, user_id: i64) -> rusqlite::Result<Option<LatestSurvey>> {
    conn.query_row(
        "SELECT s.id, s.title, s.image_url, s.status, s.created_at, s.expire_date,
                (SELECT COUNT(*) FROM survey_questions q WHERE q.survey_id = s.id),
                (SELECT COUNT(*) FROM survey_results r WHERE r.survey_id = s.id)
         FROM surveys s WHERE s.user_id = ?1
         ORDER BY s.created_at DESC, s.id DESC LIMIT 1",
        params![user_id],
        |row| {
            Ok(LatestSurvey {
                id: row.get(0)?,
                title: row.get(1)?,
                image_url: row.get(2)?,
                status: row.get(3)?,
                created_at: row.get(4)?,
                expire_date: row.get(5)?,
                questions: row.get(6)?,
                answers: row.get(7)?,
            })
        },
    )
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::temp_database;
    use crate::db::users::insert_user;
    use common::model::question::QuestionOption;

    fn draft(questions: Vec<QuestionDraft>) -> SurveyDraft {
        SurveyDraft {
            title: "Team lunch".to_string(),
            status: true,
            description: Some("<p>Where should we go?</p>".to_string()),
            expire_date: None,
            questions,
        }
    }

    fn question(id: Option<i64>, text: &str, kind: QuestionKind) -> QuestionDraft {
        QuestionDraft {
            id,
            question: text.to_string(),
            description: None,
            kind,
        }
    }

    fn radio(options: &[&str]) -> QuestionKind {
        QuestionKind::Radio {
            options: options
                .iter()
                .map(|text| QuestionOption {
                    uuid: format!("uuid-{text}"),
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn survey_round_trips_with_ordered_questions() {
        let (_dir, db) = temp_database();
        let mut conn = db.open().unwrap();
        let owner = insert_user(&conn, "Ana", "ana@example.com", "x", Utc::now()).unwrap();

        let id = insert_survey(
            &mut conn,
            owner.id,
            "team-lunch",
            None,
            &draft(vec![
                question(None, "Name?", QuestionKind::Text),
                question(None, "Pizza?", radio(&["Yes", "No"])),
            ]),
            Utc::now(),
        )
        .unwrap();

        let survey = find_survey(&conn, id).unwrap().unwrap();
        assert_eq!(survey.slug, "team-lunch");
        assert_eq!(survey.questions.len(), 2);
        assert_eq!(survey.questions[0].question, "Name?");
        assert_eq!(survey.questions[1].kind.options()[1].text, "No");
        assert_eq!(
            find_survey_by_slug(&conn, "team-lunch").unwrap().map(|s| s.id),
            Some(id)
        );
    }

    #[test]
    fn update_synchronizes_questions() {
        let (_dir, db) = temp_database();
        let mut conn = db.open().unwrap();
        let owner = insert_user(&conn, "Ana", "ana@example.com", "x", Utc::now()).unwrap();
        let id = insert_survey(
            &mut conn,
            owner.id,
            "team-lunch",
            None,
            &draft(vec![
                question(None, "Keep me", QuestionKind::Text),
                question(None, "Drop me", QuestionKind::Textarea),
            ]),
            Utc::now(),
        )
        .unwrap();
        let before = find_survey(&conn, id).unwrap().unwrap();
        let kept_id = before.questions[0].id;

        update_survey(
            &mut conn,
            id,
            None,
            &draft(vec![
                question(None, "Brand new", radio(&["A"])),
                question(Some(kept_id), "Kept and renamed", QuestionKind::Text),
                question(Some(9999), "Foreign id is inserted", QuestionKind::Text),
            ]),
            Utc::now(),
        )
        .unwrap();

        let after = find_survey(&conn, id).unwrap().unwrap();
        let texts: Vec<_> = after.questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts, vec!["Brand new", "Kept and renamed", "Foreign id is inserted"]);
        assert_eq!(after.questions[1].id, kept_id);
        assert_eq!(after.slug, "team-lunch");
    }

    #[test]
    fn insert_suffixes_taken_slugs() {
        let (_dir, db) = temp_database();
        let mut conn = db.open().unwrap();
        let owner = insert_user(&conn, "Ana", "ana@example.com", "x", Utc::now()).unwrap();

        let slugs: Vec<String> = (0..3)
            .map(|_| {
                let id = insert_survey(&mut conn, owner.id, "team-lunch", None, &draft(vec![]), Utc::now())
                    .unwrap();
                find_survey(&conn, id).unwrap().unwrap().slug
            })
            .collect();

        assert_eq!(slugs, vec!["team-lunch", "team-lunch-2", "team-lunch-3"]);
    }

    #[test]
    fn delete_cascades_to_questions() {
        let (_dir, db) = temp_database();
        let mut conn = db.open().unwrap();
        let owner = insert_user(&conn, "Ana", "ana@example.com", "x", Utc::now()).unwrap();
        let id = insert_survey(
            &mut conn,
            owner.id,
            "team-lunch",
            None,
            &draft(vec![question(None, "Q", QuestionKind::Text)]),
            Utc::now(),
        )
        .unwrap();

        delete_survey(&conn, id).unwrap();

        assert!(find_survey(&conn, id).unwrap().is_none());
        assert!(load_questions(&conn, id).unwrap().is_empty());
        assert!(!slug_exists(&conn, "team-lunch").unwrap());
    }
}
