use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One priced component line under an estimate header. Display order is
/// creation order: `created_at` ascending, id as tiebreak.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "estimate_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub estimate_header_id: Uuid,
    pub product_id: Uuid,

    pub component_name: String,

    /// Finished dimensions of the assembled piece.
    pub overall_length: Decimal,
    pub overall_breadth: Decimal,
    pub overall_height: Decimal,

    pub labor_charges: Decimal,
    pub polishing_charges: Decimal,

    /// Raw-material dimensions used for the timber volume.
    pub component_length: Decimal,
    pub component_breadth: Decimal,
    pub component_thickness: Decimal,

    /// Timber volume in cubic feet and the rate it is priced at.
    pub component_cft: Decimal,
    pub component_cost_per_cft: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::estimate_header::Entity",
        from = "Column::EstimateHeaderId",
        to = "super::estimate_header::Column::Id"
    )]
    EstimateHeader,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::estimate_header::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EstimateHeader.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        let now = Utc::now();

        // The aggregate writer assigns staggered timestamps to keep input
        // order stable under the (created_at, id) display ordering.
        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }

        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}
