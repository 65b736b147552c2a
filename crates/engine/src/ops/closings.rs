use base64::Engine as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    CashClosing, CloseRegisterCmd, EngineError, ResultEngine, closings,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

/// Largest page `list_closings` returns; bigger limits are clamped.
pub const MAX_CLOSINGS_LIMIT: u64 = 200;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ClosingsCursor {
    closed_at: DateTime<Utc>,
    closing_id: String,
}

impl ClosingsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid closings cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid closings cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid closings cursor".to_string()))
    }
}

impl Engine {
    /// Close the register for `cmd.date`.
    ///
    /// Computes the day balance, compares it with the counted amount and
    /// stores the snapshot. Closings are append-only.
    pub async fn close_register(&self, cmd: CloseRegisterCmd) -> ResultEngine<CashClosing> {
        let user = normalize_required_text(&cmd.user, "user")?;
        let notes = normalize_optional_text(cmd.notes.as_deref());
        let balance = self.balance_for_day(cmd.date).await?;

        let closing = CashClosing::new(
            cmd.date,
            cmd.closed_at,
            user,
            cmd.counted,
            cmd.currency,
            notes,
            balance,
        )?;

        with_tx!(self, |db_tx| {
            closings::ActiveModel::try_from(&closing)?
                .insert(&db_tx)
                .await?;
            Ok::<_, EngineError>(())
        })?;

        tracing::info!(
            id = %closing.id,
            date = %closing.date,
            status = closing.status.as_str(),
            counted = %closing.counted,
            calculated = %closing.calculated,
            difference = %closing.difference,
            "register closed"
        );
        Ok(closing)
    }

    /// Lists closings newest first.
    ///
    /// Pagination is newest → older by `(closed_at DESC, id DESC)`; the
    /// returned cursor is `None` on the last page. `limit` is clamped to
    /// [`MAX_CLOSINGS_LIMIT`].
    pub async fn list_closings(
        &self,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<CashClosing>, Option<String>)> {
        if limit == 0 {
            return Err(EngineError::InvalidCursor(
                "limit must be > 0".to_string(),
            ));
        }
        let limit = limit.min(MAX_CLOSINGS_LIMIT);

        let mut query = closings::Entity::find()
            .order_by_desc(closings::Column::ClosedAt)
            .order_by_desc(closings::Column::Id)
            .limit(limit.saturating_add(1));

        if let Some(cursor) = cursor {
            let cursor = ClosingsCursor::decode(cursor)?;
            query = query.filter(
                Condition::any()
                    .add(closings::Column::ClosedAt.lt(cursor.closed_at))
                    .add(
                        Condition::all()
                            .add(closings::Column::ClosedAt.eq(cursor.closed_at))
                            .add(closings::Column::Id.lt(cursor.closing_id)),
                    ),
            );
        }

        let mut models = query.all(&self.database).await?;
        let has_more = models.len() as u64 > limit;
        models.truncate(limit as usize);

        let items = models
            .into_iter()
            .map(CashClosing::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        let next = match (has_more, items.last()) {
            (true, Some(last)) => Some(
                ClosingsCursor {
                    closed_at: last.closed_at,
                    closing_id: last.id.to_string(),
                }
                .encode()?,
            ),
            _ => None,
        };
        Ok((items, next))
    }

    pub async fn closing(&self, id: Uuid) -> ResultEngine<CashClosing> {
        let model = closings::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("closing not exists".to_string()))?;
        CashClosing::try_from(model)
    }
}
