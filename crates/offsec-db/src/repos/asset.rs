//! Asset catalog repository.

use offsec_core::entities::Asset;
use offsec_core::enums::AssetType;
use offsec_core::ids::PREFIX_ASSET;
use offsec_core::validation::require_text;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    collect_rows, fmt_ts, get_opt_string, now, parse_datetime, parse_enum, parse_optional_enum,
};
use crate::inputs::NewAsset;
use crate::service::OffsecService;
use crate::updates::SetClauses;
use crate::updates::asset::AssetUpdate;

/// Column list shared with joins; `a` is the assets alias.
pub(crate) const ASSET_COLUMNS: &str = "a.id, a.asset_type, a.value, a.name, a.description, \
     a.environment, a.business_unit, a.criticality, a.created_at, a.updated_at";

/// Number of columns in [`ASSET_COLUMNS`].
pub(crate) const ASSET_COLUMN_COUNT: i32 = 10;

pub(crate) fn row_to_asset(row: &libsql::Row) -> Result<Asset, DatabaseError> {
    Ok(Asset {
        id: row.get::<String>(0)?,
        asset_type: parse_enum(&row.get::<String>(1)?)?,
        value: row.get::<String>(2)?,
        name: get_opt_string(row, 3)?,
        description: get_opt_string(row, 4)?,
        environment: get_opt_string(row, 5)?,
        business_unit: get_opt_string(row, 6)?,
        criticality: parse_optional_enum(get_opt_string(row, 7)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        updated_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

pub(crate) async fn get(conn: &libsql::Connection, id: &str) -> Result<Asset, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {ASSET_COLUMNS} FROM assets a WHERE a.id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("asset", id))?;
    row_to_asset(&row)
}

/// Fail with `NotFound` naming the first id that does not exist.
pub(crate) async fn ensure_all_exist(
    conn: &libsql::Connection,
    ids: &[String],
) -> Result<(), DatabaseError> {
    for id in ids {
        let mut rows = conn
            .query("SELECT 1 FROM assets WHERE id = ?1", [id.as_str()])
            .await?;
        if rows.next().await?.is_none() {
            return Err(DatabaseError::not_found("asset", id.as_str()));
        }
    }
    Ok(())
}

/// Assets linked to a finding, in link order.
pub(crate) async fn list_for_finding(
    conn: &libsql::Connection,
    finding_id: &str,
) -> Result<Vec<Asset>, DatabaseError> {
    let rows = conn
        .query(
            &format!(
                "SELECT {ASSET_COLUMNS} FROM finding_assets fa
                 JOIN assets a ON a.id = fa.asset_id
                 WHERE fa.finding_id = ?1 ORDER BY fa.rowid"
            ),
            [finding_id],
        )
        .await?;
    collect_rows(rows, row_to_asset).await
}

pub(crate) async fn insert(conn: &libsql::Connection, new: &NewAsset) -> Result<Asset, DatabaseError> {
    require_text("value", &new.value)?;
    let id = generate_id(conn, PREFIX_ASSET).await?;
    let ts = fmt_ts(now());
    conn.execute(
        "INSERT INTO assets (id, asset_type, value, name, description, environment, business_unit, criticality, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        libsql::params![
            id.as_str(),
            new.asset_type.as_str(),
            new.value.trim(),
            new.name.as_deref(),
            new.description.as_deref(),
            new.environment.as_deref(),
            new.business_unit.as_deref(),
            new.criticality.map(|c| c.as_str()),
            ts.as_str(),
            ts.as_str()
        ],
    )
    .await?;
    tracing::info!(asset_id = %id, asset_type = %new.asset_type, "asset created");
    get(conn, &id).await
}

impl OffsecService {
    pub async fn create_asset(&self, new: NewAsset) -> Result<Asset, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = insert(&uow, &new).await;
        uow.finish(result).await
    }

    pub async fn get_asset(&self, id: &str) -> Result<Asset, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = get(&uow, id).await;
        uow.finish(result).await
    }

    /// List assets in creation order, optionally of one type.
    pub async fn list_assets(
        &self,
        asset_type: Option<AssetType>,
    ) -> Result<Vec<Asset>, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            let rows = match asset_type {
                Some(t) => {
                    uow.query(
                        &format!(
                            "SELECT {ASSET_COLUMNS} FROM assets a WHERE a.asset_type = ?1 ORDER BY a.rowid"
                        ),
                        [t.as_str()],
                    )
                    .await?
                }
                None => {
                    uow.query(
                        &format!("SELECT {ASSET_COLUMNS} FROM assets a ORDER BY a.rowid"),
                        (),
                    )
                    .await?
                }
            };
            collect_rows(rows, row_to_asset).await
        }
        .await;
        uow.finish(result).await
    }

    pub async fn update_asset(&self, id: &str, update: AssetUpdate) -> Result<Asset, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            get(&uow, id).await?;

            let mut sets = SetClauses::default();
            if let Some(asset_type) = update.asset_type {
                sets.push("asset_type", asset_type.as_str());
            }
            if let Some(ref value) = update.value {
                require_text("value", value)?;
                sets.push("value", value.trim());
            }
            if let Some(ref name) = update.name {
                sets.push("name", name.as_deref());
            }
            if let Some(ref description) = update.description {
                sets.push("description", description.as_deref());
            }
            if let Some(ref environment) = update.environment {
                sets.push("environment", environment.as_deref());
            }
            if let Some(ref business_unit) = update.business_unit {
                sets.push("business_unit", business_unit.as_deref());
            }
            if let Some(criticality) = update.criticality {
                sets.push("criticality", criticality.map(|c| c.as_str()));
            }
            if sets.is_empty() {
                return get(&uow, id).await;
            }
            sets.push("updated_at", fmt_ts(now()));

            let (sql, params) = sets.into_sql("assets", id);
            uow.execute(&sql, libsql::params_from_iter(params)).await?;
            tracing::info!(asset_id = %id, "asset updated");
            get(&uow, id).await
        }
        .await;
        uow.finish(result).await
    }
}
