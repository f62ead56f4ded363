//! Generic repository over sea-orm entities.
//!
//! Every method forwards a filter (or a raw SQL condition), an order clause
//! and optional paging into sea-orm's query builder:
//!
//! ```ignore
//! let repo = Repository::<user::Entity>::new(&db);
//!
//! // single row, first by primary key
//! let alice = repo.find_by(&Filter::new().eq("name", "alice")).await?;
//!
//! // every user, newest first, with their posts
//! let users = repo
//!     .find_all_by_with_preload::<post::Entity>(&Filter::new(), "created_at desc")
//!     .await?;
//!
//! // second page of ten
//! let page = repo
//!     .find_all_by_with_pagination(&Filter::new(), Pagination::new(2, 10), "id")
//!     .await?;
//! ```
//!
//! Update and delete refuse an empty filter; a table-wide write has to be
//! spelled out with a raw statement instead.

pub mod filter;
pub mod order;
pub mod preload;

use std::marker::PhantomData;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, Condition, ConnectionTrait, DatabaseConnection,
    EntityName, EntityTrait, IntoActiveModel, Iterable, PaginatorTrait, PrimaryKeyToColumn,
    QueryFilter, QueryOrder, QuerySelect, Related, Select,
};

pub use filter::Filter;
pub use order::{Direction, OrderBy};
pub use preload::{WithNested, WithRelated};

use crate::error::DbError;
use crate::pagination::{Paginated, Pagination};

/// Where rows come from: a column filter or a raw SQL condition.
#[derive(Debug, Clone, Copy)]
enum Criteria<'q> {
    Filter(&'q Filter),
    Raw(&'q str),
}

impl Criteria<'_> {
    fn condition<E: EntityTrait>(&self) -> Result<Condition, DbError> {
        match self {
            Self::Filter(filter) => filter.condition::<E>(),
            Self::Raw(query) if query.trim().is_empty() => Ok(Condition::all()),
            Self::Raw(query) => Ok(Condition::all().add(Expr::cust(query.to_string()))),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Filter(filter) => filter.to_string(),
            Self::Raw(query) => format!("'{query}'"),
        }
    }
}

/// CRUD helpers for entity `E` over connection `C` (a pool or a transaction).
pub struct Repository<'a, E, C = DatabaseConnection> {
    db: &'a C,
    entity: PhantomData<E>,
}

impl<'a, E, C> Repository<'a, E, C>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    pub fn new(db: &'a C) -> Self {
        Self {
            db,
            entity: PhantomData,
        }
    }

    pub fn connection(&self) -> &'a C {
        self.db
    }

    fn table() -> String {
        E::default().table_name().to_string()
    }

    fn select(&self, criteria: Criteria<'_>, order_by: &str) -> Result<Select<E>, DbError> {
        let order: OrderBy = order_by.parse()?;
        let select = E::find().filter(criteria.condition::<E>()?);
        order.apply::<E, _>(select)
    }

    /// First matching row by primary key, or `NotFound`.
    async fn first(&self, criteria: Criteria<'_>) -> Result<E::Model, DbError> {
        let mut select = self.select(criteria, "")?;
        for key in E::PrimaryKey::iter() {
            select = select.order_by_asc(key.into_column());
        }
        select
            .one(self.db)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: Self::table(),
                filter: criteria.describe(),
            })
    }

    async fn all(&self, criteria: Criteria<'_>, order_by: &str) -> Result<Vec<E::Model>, DbError> {
        let rows = self.select(criteria, order_by)?.all(self.db).await?;
        tracing::debug!(table = %Self::table(), rows = rows.len(), "find all");
        Ok(rows)
    }

    async fn page(
        &self,
        criteria: Criteria<'_>,
        page: Pagination,
        order_by: &str,
    ) -> Result<Paginated<E::Model>, DbError> {
        let select = self.select(criteria, order_by)?;
        let items = select
            .clone()
            .limit(page.limit())
            .offset(page.offset())
            .all(self.db)
            .await?;
        let total = select.count(self.db).await?;
        Ok(Paginated::new(items, total, page))
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Insert a new row and return it as stored.
    pub async fn create<A>(&self, model: A) -> Result<E::Model, DbError>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'a,
        E::Model: IntoActiveModel<A>,
    {
        let created = model.insert(self.db).await?;
        tracing::debug!(table = %Self::table(), "created row");
        Ok(created)
    }

    /// Set `values` on every row matching `by`. Returns rows affected.
    ///
    /// `update_by(&Filter::new().eq("id", 1), &Filter::new().eq("name", "YYY"))`
    pub async fn update_by(&self, by: &Filter, values: &Filter) -> Result<u64, DbError> {
        if by.is_empty() {
            return Err(DbError::InvalidFilter(
                "refusing to update without a condition".into(),
            ));
        }
        if values.is_empty() {
            return Err(DbError::InvalidFilter("no values to update".into()));
        }

        let mut update = E::update_many();
        for (column, expr) in values.assignments::<E>()? {
            update = update.col_expr(column, expr);
        }
        let result = update.filter(by.condition::<E>()?).exec(self.db).await?;
        tracing::debug!(table = %Self::table(), rows = result.rows_affected, "updated rows");
        Ok(result.rows_affected)
    }

    /// Delete every row matching `by`. Returns rows affected.
    pub async fn delete_by(&self, by: &Filter) -> Result<u64, DbError> {
        if by.is_empty() {
            return Err(DbError::InvalidFilter(
                "refusing to delete without a condition".into(),
            ));
        }
        let result = E::delete_many()
            .filter(by.condition::<E>()?)
            .exec(self.db)
            .await?;
        tracing::debug!(table = %Self::table(), rows = result.rows_affected, "deleted rows");
        Ok(result.rows_affected)
    }

    // ------------------------------------------------------------------
    // Single row
    // ------------------------------------------------------------------

    /// `find_by(&Filter::new().eq("id", 1))`
    pub async fn find_by(&self, by: &Filter) -> Result<E::Model, DbError> {
        self.first(Criteria::Filter(by)).await
    }

    /// Row plus every related `R`.
    pub async fn find_by_with_preload<R>(
        &self,
        by: &Filter,
    ) -> Result<WithRelated<E::Model, R::Model>, DbError>
    where
        E: Related<R>,
        R: EntityTrait,
        R::Model: Send + Sync,
    {
        let row = self.first(Criteria::Filter(by)).await?;
        let mut loaded = preload::load::<E, R, C>(self.db, vec![row]).await?;
        loaded.pop().ok_or_else(|| DbError::NotFound {
            resource: Self::table(),
            filter: by.to_string(),
        })
    }

    /// Row plus related `R`, each with its related `S` (e.g. user -> posts -> comments).
    pub async fn find_by_with_nested_preload<R, S>(
        &self,
        by: &Filter,
    ) -> Result<WithNested<E::Model, R::Model, S::Model>, DbError>
    where
        E: Related<R>,
        R: EntityTrait + Related<S>,
        R::Model: Send + Sync,
        S: EntityTrait,
        S::Model: Send + Sync,
    {
        let row = self.first(Criteria::Filter(by)).await?;
        let mut loaded = preload::load_nested::<E, R, S, C>(self.db, vec![row]).await?;
        loaded.pop().ok_or_else(|| DbError::NotFound {
            resource: Self::table(),
            filter: by.to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Filtered lists
    // ------------------------------------------------------------------

    /// `find_all_by(&Filter::new(), "created_at desc")` returns every row.
    pub async fn find_all_by(&self, by: &Filter, order_by: &str) -> Result<Vec<E::Model>, DbError> {
        self.all(Criteria::Filter(by), order_by).await
    }

    pub async fn find_all_by_with_preload<R>(
        &self,
        by: &Filter,
        order_by: &str,
    ) -> Result<Vec<WithRelated<E::Model, R::Model>>, DbError>
    where
        E: Related<R>,
        R: EntityTrait,
        R::Model: Send + Sync,
    {
        let rows = self.all(Criteria::Filter(by), order_by).await?;
        preload::load::<E, R, C>(self.db, rows).await
    }

    pub async fn find_all_by_with_nested_preload<R, S>(
        &self,
        by: &Filter,
        order_by: &str,
    ) -> Result<Vec<WithNested<E::Model, R::Model, S::Model>>, DbError>
    where
        E: Related<R>,
        R: EntityTrait + Related<S>,
        R::Model: Send + Sync,
        S: EntityTrait,
        S::Model: Send + Sync,
    {
        let rows = self.all(Criteria::Filter(by), order_by).await?;
        preload::load_nested::<E, R, S, C>(self.db, rows).await
    }

    /// `find_all_by_with_pagination(&Filter::new(), Pagination::new(2, 10), "created_at desc")`
    /// returns rows 11..=20.
    pub async fn find_all_by_with_pagination(
        &self,
        by: &Filter,
        page: Pagination,
        order_by: &str,
    ) -> Result<Paginated<E::Model>, DbError> {
        self.page(Criteria::Filter(by), page, order_by).await
    }

    pub async fn find_all_by_with_preload_and_pagination<R>(
        &self,
        by: &Filter,
        page: Pagination,
        order_by: &str,
    ) -> Result<Paginated<WithRelated<E::Model, R::Model>>, DbError>
    where
        E: Related<R>,
        R: EntityTrait,
        R::Model: Send + Sync,
    {
        let mut paged = self.page(Criteria::Filter(by), page, order_by).await?;
        let rows = std::mem::take(&mut paged.items);
        let items = preload::load::<E, R, C>(self.db, rows).await?;
        Ok(paged.with_items(items))
    }

    pub async fn find_all_by_with_nested_preload_and_pagination<R, S>(
        &self,
        by: &Filter,
        page: Pagination,
        order_by: &str,
    ) -> Result<Paginated<WithNested<E::Model, R::Model, S::Model>>, DbError>
    where
        E: Related<R>,
        R: EntityTrait + Related<S>,
        R::Model: Send + Sync,
        S: EntityTrait,
        S::Model: Send + Sync,
    {
        let mut paged = self.page(Criteria::Filter(by), page, order_by).await?;
        let rows = std::mem::take(&mut paged.items);
        let items = preload::load_nested::<E, R, S, C>(self.db, rows).await?;
        Ok(paged.with_items(items))
    }

    // ------------------------------------------------------------------
    // Raw conditions
    //
    // `query` is a SQL condition inserted verbatim into WHERE. Never build
    // it from untrusted input.
    // ------------------------------------------------------------------

    /// `find_all_using_custom_query("name = 'XXX' AND email = 'YYY'", "created_at desc")`
    pub async fn find_all_using_custom_query(
        &self,
        query: &str,
        order_by: &str,
    ) -> Result<Vec<E::Model>, DbError> {
        self.all(Criteria::Raw(query), order_by).await
    }

    pub async fn find_all_using_custom_query_with_preload<R>(
        &self,
        query: &str,
        order_by: &str,
    ) -> Result<Vec<WithRelated<E::Model, R::Model>>, DbError>
    where
        E: Related<R>,
        R: EntityTrait,
        R::Model: Send + Sync,
    {
        let rows = self.all(Criteria::Raw(query), order_by).await?;
        preload::load::<E, R, C>(self.db, rows).await
    }

    pub async fn find_all_using_custom_query_with_nested_preload<R, S>(
        &self,
        query: &str,
        order_by: &str,
    ) -> Result<Vec<WithNested<E::Model, R::Model, S::Model>>, DbError>
    where
        E: Related<R>,
        R: EntityTrait + Related<S>,
        R::Model: Send + Sync,
        S: EntityTrait,
        S::Model: Send + Sync,
    {
        let rows = self.all(Criteria::Raw(query), order_by).await?;
        preload::load_nested::<E, R, S, C>(self.db, rows).await
    }

    pub async fn find_all_using_custom_query_with_pagination(
        &self,
        query: &str,
        order_by: &str,
        page: Pagination,
    ) -> Result<Paginated<E::Model>, DbError> {
        self.page(Criteria::Raw(query), page, order_by).await
    }

    pub async fn find_all_using_custom_query_with_preload_and_pagination<R>(
        &self,
        query: &str,
        order_by: &str,
        page: Pagination,
    ) -> Result<Paginated<WithRelated<E::Model, R::Model>>, DbError>
    where
        E: Related<R>,
        R: EntityTrait,
        R::Model: Send + Sync,
    {
        let mut paged = self.page(Criteria::Raw(query), page, order_by).await?;
        let rows = std::mem::take(&mut paged.items);
        let items = preload::load::<E, R, C>(self.db, rows).await?;
        Ok(paged.with_items(items))
    }

    pub async fn find_all_using_custom_query_with_nested_preload_and_pagination<R, S>(
        &self,
        query: &str,
        order_by: &str,
        page: Pagination,
    ) -> Result<Paginated<WithNested<E::Model, R::Model, S::Model>>, DbError>
    where
        E: Related<R>,
        R: EntityTrait + Related<S>,
        R::Model: Send + Sync,
        S: EntityTrait,
        S::Model: Send + Sync,
    {
        let mut paged = self.page(Criteria::Raw(query), page, order_by).await?;
        let rows = std::mem::take(&mut paged.items);
        let items = preload::load_nested::<E, R, S, C>(self.db, rows).await?;
        Ok(paged.with_items(items))
    }
}
