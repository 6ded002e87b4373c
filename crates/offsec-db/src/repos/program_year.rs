//! Program year repository.

use offsec_core::entities::ProgramYear;
use offsec_core::ids::PREFIX_PROGRAM_YEAR;
use offsec_core::validation::validate_year_label;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{collect_rows, fmt_ts, get_opt_string, now, parse_datetime};
use crate::inputs::NewProgramYear;
use crate::service::OffsecService;
use crate::updates::SetClauses;
use crate::updates::program_year::ProgramYearUpdate;

const SELECT: &str =
    "SELECT id, year, theme, objectives, created_at, updated_at FROM program_years";

fn row_to_program_year(row: &libsql::Row) -> Result<ProgramYear, DatabaseError> {
    Ok(ProgramYear {
        id: row.get::<String>(0)?,
        year: row.get::<String>(1)?,
        theme: get_opt_string(row, 2)?,
        objectives: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

pub(crate) async fn get(conn: &libsql::Connection, id: &str) -> Result<ProgramYear, DatabaseError> {
    let mut rows = conn.query(&format!("{SELECT} WHERE id = ?1"), [id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("program year", id))?;
    row_to_program_year(&row)
}

pub(crate) async fn find_by_year(
    conn: &libsql::Connection,
    year: &str,
) -> Result<Option<ProgramYear>, DatabaseError> {
    let mut rows = conn.query(&format!("{SELECT} WHERE year = ?1"), [year]).await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_program_year(&row)?)),
        None => Ok(None),
    }
}

pub(crate) async fn insert(
    conn: &libsql::Connection,
    new: &NewProgramYear,
) -> Result<ProgramYear, DatabaseError> {
    validate_year_label(&new.year)?;
    let id = generate_id(conn, PREFIX_PROGRAM_YEAR).await?;
    let ts = fmt_ts(now());
    conn.execute(
        "INSERT INTO program_years (id, year, theme, objectives, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        libsql::params![
            id.as_str(),
            new.year.trim(),
            new.theme.as_deref(),
            new.objectives.as_deref(),
            ts.as_str(),
            ts.as_str()
        ],
    )
    .await?;
    tracing::info!(program_year_id = %id, year = %new.year, "program year created");
    get(conn, &id).await
}

/// Resolve a program year by label, creating it when missing.
pub(crate) async fn get_or_create(
    conn: &libsql::Connection,
    year: &str,
) -> Result<ProgramYear, DatabaseError> {
    if let Some(existing) = find_by_year(conn, year.trim()).await? {
        return Ok(existing);
    }
    insert(
        conn,
        &NewProgramYear {
            year: year.trim().to_string(),
            ..NewProgramYear::default()
        },
    )
    .await
}

impl OffsecService {
    pub async fn create_program_year(&self, new: NewProgramYear) -> Result<ProgramYear, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = insert(&uow, &new).await;
        uow.finish(result).await
    }

    pub async fn get_program_year(&self, id: &str) -> Result<ProgramYear, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = get(&uow, id).await;
        uow.finish(result).await
    }

    /// Labels are four digits, so text order is chronological.
    pub async fn list_program_years(&self) -> Result<Vec<ProgramYear>, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            let rows = uow.query(&format!("{SELECT} ORDER BY year"), ()).await?;
            collect_rows(rows, row_to_program_year).await
        }
        .await;
        uow.finish(result).await
    }

    /// Correct a program year's label, theme or objectives.
    pub async fn update_program_year(
        &self,
        id: &str,
        update: ProgramYearUpdate,
    ) -> Result<ProgramYear, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            get(&uow, id).await?;

            let mut sets = SetClauses::default();
            if let Some(ref year) = update.year {
                validate_year_label(year)?;
                sets.push("year", year.trim());
            }
            if let Some(ref theme) = update.theme {
                sets.push("theme", theme.as_deref());
            }
            if let Some(ref objectives) = update.objectives {
                sets.push("objectives", objectives.as_deref());
            }
            if sets.is_empty() {
                return get(&uow, id).await;
            }
            sets.push("updated_at", fmt_ts(now()));

            let (sql, params) = sets.into_sql("program_years", id);
            uow.execute(&sql, libsql::params_from_iter(params)).await?;
            tracing::info!(program_year_id = %id, "program year updated");
            get(&uow, id).await
        }
        .await;
        uow.finish(result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_service;
    use crate::updates::program_year::ProgramYearUpdateBuilder;

    #[tokio::test]
    async fn create_and_get_program_year() {
        let svc = test_service().await;
        let py = svc
            .create_program_year(NewProgramYear {
                year: "2025".into(),
                theme: Some("Assume breach".into()),
                objectives: None,
            })
            .await
            .unwrap();

        assert!(py.id.starts_with("pyr-"));
        let fetched = svc.get_program_year(&py.id).await.unwrap();
        assert_eq!(fetched, py);
    }

    #[tokio::test]
    async fn duplicate_year_is_conflict() {
        let svc = test_service().await;
        let new = NewProgramYear {
            year: "2025".into(),
            ..NewProgramYear::default()
        };
        svc.create_program_year(new.clone()).await.unwrap();
        let err = svc.create_program_year(new).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn label_correction_and_theme_clear() {
        let svc = test_service().await;
        let py = svc
            .create_program_year(NewProgramYear {
                year: "2052".into(),
                theme: Some("typo".into()),
                objectives: None,
            })
            .await
            .unwrap();

        let update = ProgramYearUpdateBuilder::new()
            .year("2025")
            .theme(None)
            .build();
        let updated = svc.update_program_year(&py.id, update).await.unwrap();
        assert_eq!(updated.year, "2025");
        assert_eq!(updated.theme, None);
        assert!(updated.updated_at >= py.updated_at);
    }

    #[tokio::test]
    async fn non_year_labels_are_rejected() {
        let svc = test_service().await;
        for label in ["abc", "25", "20250", "  "] {
            let err = svc
                .create_program_year(NewProgramYear {
                    year: label.into(),
                    ..NewProgramYear::default()
                })
                .await
                .unwrap_err();
            assert!(matches!(err, DatabaseError::Validation(_)), "{label:?}: {err:?}");
        }

        let py = svc
            .create_program_year(NewProgramYear {
                year: "2025".into(),
                ..NewProgramYear::default()
            })
            .await
            .unwrap();
        let err = svc
            .update_program_year(&py.id, ProgramYearUpdateBuilder::new().year("next").build())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
        assert_eq!(svc.get_program_year(&py.id).await.unwrap().year, "2025");
    }

    #[tokio::test]
    async fn missing_program_year_is_not_found() {
        let svc = test_service().await;
        let err = svc.get_program_year("pyr-00000000").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_is_ordered_by_year() {
        let svc = test_service().await;
        for year in ["2026", "0999", "2024", "2025"] {
            svc.create_program_year(NewProgramYear {
                year: year.into(),
                ..NewProgramYear::default()
            })
            .await
            .unwrap();
        }
        let years: Vec<String> = svc
            .list_program_years()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.year)
            .collect();
        assert_eq!(years, vec!["0999", "2024", "2025", "2026"]);
    }
}
