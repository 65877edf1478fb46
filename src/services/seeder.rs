use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::{debug, info, instrument};

use crate::{
    entities::unit::{self, Entity as UnitEntity},
    errors::ServiceError,
};

/// Units every kitchen starts with, as `(name, symbol)`.
pub const DEFAULT_UNITS: &[(&str, &str)] = &[
    ("Kilogram", "kg"),
    ("Gram", "g"),
    ("Liter", "L"),
    ("Meter", "m"),
    ("Packages", "pcs"),
    ("Persen", "%"),
];

/// Inserts each default unit whose name is not present yet. Returns how
/// many rows were added.
#[instrument(skip(conn))]
pub async fn seed_units<C: ConnectionTrait>(conn: &C) -> Result<usize, ServiceError> {
    let mut inserted = 0;
    for (name, symbol) in DEFAULT_UNITS {
        let existing = UnitEntity::find()
            .filter(unit::Column::Name.eq(*name))
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            debug!(unit = *name, "Unit already present");
            continue;
        }

        unit::ActiveModel {
            name: Set(name.to_string()),
            symbol: Set(symbol.to_string()),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| ServiceError::from_write(e, format!("Unit symbol '{}' is already in use", symbol)))?;
        inserted += 1;
    }

    info!(inserted, total = DEFAULT_UNITS.len(), "Default units seeded");
    Ok(inserted)
}
