use chrono::Utc;
use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, Hours, Purchase, RecordPurchaseCmd, ResultEngine, RolloverStatus, members,
    purchases, purchases::expiry_dates,
};

use super::{Engine, cas_update_member, normalize_required_text, require_member, with_tx};

impl Engine {
    /// Records a purchase and settles the previous purchase's rollover.
    ///
    /// Rollover is decided here, at renewal time, against the member's
    /// immediate predecessor purchase only:
    /// - renewal on or before the predecessor's rollover deadline carries the
    ///   predecessor's unused balance into the new purchase and marks it
    ///   `applied`;
    /// - a later renewal carries nothing and marks it `forfeited`.
    ///
    /// The unused balance is the predecessor's `total_valid_purchased` minus
    /// the member's cumulative used hours, clamped to `[0, total_valid_purchased]`.
    /// Only the new base hours are added to the member's granted total; the
    /// carried hours were already counted when they were first granted.
    pub async fn record_purchase(&self, cmd: RecordPurchaseCmd) -> ResultEngine<Purchase> {
        let plan_name = normalize_required_text(&cmd.plan_name, "plan name")?;
        let created_by = normalize_required_text(&cmd.created_by, "created_by")?;
        let purchase_date = cmd.purchased_at.unwrap_or_else(Utc::now);

        with_tx!(self, |db_tx| {
            let member = require_member(&db_tx, &cmd.member_id).await?;

            let previous = purchases::Entity::find()
                .filter(purchases::Column::MemberId.eq(member.id.as_str()))
                .order_by_desc(purchases::Column::PurchaseDate)
                .one(&db_tx)
                .await?;

            let mut rollover = Hours::ZERO;
            let mut status = RolloverStatus::NotApplicable;

            if let Some(prev) = &previous {
                if prev.purchase_date >= purchase_date {
                    return Err(EngineError::InvalidPurchaseOrder(format!(
                        "purchase at {purchase_date} does not postdate the latest purchase at {}",
                        prev.purchase_date
                    )));
                }
                status = RolloverStatus::Pending;

                let (_, deadline) = expiry_dates(prev.purchase_date);
                let prev_total = Hours::new(prev.total_valid_purchased_centi);
                let unused = (prev_total - Hours::new(member.total_hours_used_centi))
                    .clamp_to(Hours::ZERO, prev_total);

                let prev_status = if purchase_date.date_naive() <= deadline {
                    rollover = unused;
                    RolloverStatus::Applied
                } else {
                    RolloverStatus::Forfeited
                };

                let prev_patch = purchases::ActiveModel {
                    id: ActiveValue::Set(prev.id.clone()),
                    rollover_status: ActiveValue::Set(prev_status.as_str().to_string()),
                    ..Default::default()
                };
                prev_patch.update(&db_tx).await?;
            }

            let purchase = Purchase::new(
                member.id.clone(),
                plan_name,
                cmd.hours,
                rollover,
                purchase_date,
                status,
                created_by,
            )?;
            purchases::ActiveModel::from(&purchase).insert(&db_tx).await?;

            let new_granted = Hours::new(member.total_hours_granted_centi)
                .checked_add(purchase.hours_granted)
                .ok_or_else(|| {
                    EngineError::Validation("purchase overflows the granted-hours total".to_string())
                })?;
            let member_patch = members::ActiveModel {
                total_hours_granted_centi: ActiveValue::Set(new_granted.centi()),
                ..Default::default()
            };
            cas_update_member(&db_tx, &member, member_patch).await?;

            Ok(purchase)
        })
    }

    /// Fetches a purchase by id.
    pub async fn purchase(&self, purchase_id: &str) -> ResultEngine<Purchase> {
        let model = purchases::Entity::find_by_id(purchase_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("purchase not exists".to_string()))?;
        Purchase::try_from(model)
    }

    /// Current rollover status of a purchase.
    pub async fn rollover_status(&self, purchase_id: &str) -> ResultEngine<RolloverStatus> {
        let purchase = self.purchase(purchase_id).await?;
        Ok(purchase.rollover_status)
    }

    /// Lists a member's purchases, newest first. `page` is 1-indexed.
    ///
    /// Returns the page of purchases and the total count.
    pub async fn member_purchases(
        &self,
        member_id: &str,
        page: u64,
        page_size: u64,
    ) -> ResultEngine<(Vec<Purchase>, u64)> {
        require_member(&self.database, member_id).await?;

        let page_size = page_size.clamp(1, 200);
        let paginator = purchases::Entity::find()
            .filter(purchases::Column::MemberId.eq(member_id))
            .order_by_desc(purchases::Column::PurchaseDate)
            .paginate(&self.database, page_size);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(Purchase::try_from(model)?);
        }
        Ok((out, total))
    }
}
