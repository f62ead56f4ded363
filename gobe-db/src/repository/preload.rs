//! Association loading.
//!
//! Related rows are fetched with one extra query per level through sea-orm's
//! loader, so paging the parent query stays correct. Has-many and
//! many-to-many relations yield every related row; belongs-to and has-one
//! relations yield zero or one.

use sea_orm::{ConnectionTrait, EntityTrait, LoaderTrait, Related, RelationType};

use crate::error::DbError;

/// A row with its directly related rows.
pub type WithRelated<M, R> = (M, Vec<R>);

/// A row with its related rows, each carrying their own related rows.
pub type WithNested<M, R, S> = (M, Vec<(R, Vec<S>)>);

/// Attach every `R` related to each row.
pub(crate) async fn load<E, R, C>(
    db: &C,
    rows: Vec<E::Model>,
) -> Result<Vec<WithRelated<E::Model, R::Model>>, DbError>
where
    E: EntityTrait + Related<R>,
    E::Model: Sync,
    R: EntityTrait,
    R::Model: Send + Sync,
    C: ConnectionTrait,
{
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let related = related_groups::<E, R, C>(db, &rows).await?;
    Ok(rows.into_iter().zip(related).collect())
}

/// One group of `R` rows per entry of `rows`, in the same order.
async fn related_groups<E, R, C>(db: &C, rows: &[E::Model]) -> Result<Vec<Vec<R::Model>>, DbError>
where
    E: EntityTrait + Related<R>,
    E::Model: Sync,
    R: EntityTrait,
    R::Model: Send + Sync,
    C: ConnectionTrait,
{
    let single = <E as Related<R>>::via().is_none()
        && matches!(<E as Related<R>>::to().rel_type, RelationType::HasOne);
    if single {
        let parents = rows.load_one(R::default(), db).await?;
        Ok(parents.into_iter().map(|p| p.into_iter().collect()).collect())
    } else {
        Ok(rows.load_many(R::default(), db).await?)
    }
}

/// Attach `R` rows and, below each of them, their `S` rows.
pub(crate) async fn load_nested<E, R, S, C>(
    db: &C,
    rows: Vec<E::Model>,
) -> Result<Vec<WithNested<E::Model, R::Model, S::Model>>, DbError>
where
    E: EntityTrait + Related<R>,
    E::Model: Sync,
    R: EntityTrait + Related<S>,
    R::Model: Send + Sync,
    S: EntityTrait,
    S::Model: Send + Sync,
    C: ConnectionTrait,
{
    let first = load::<E, R, C>(db, rows).await?;

    let children: Vec<R::Model> = first
        .iter()
        .flat_map(|(_, kids)| kids.iter().cloned())
        .collect();
    let grandchildren = if children.is_empty() {
        Vec::new()
    } else {
        related_groups::<R, S, C>(db, &children).await?
    };

    // one group per child, in child order
    let mut groups = grandchildren.into_iter();
    let nested = first
        .into_iter()
        .map(|(row, kids)| {
            let kids = kids
                .into_iter()
                .map(|kid| (kid, groups.next().unwrap_or_default()))
                .collect();
            (row, kids)
        })
        .collect();
    Ok(nested)
}

