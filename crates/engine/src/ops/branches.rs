use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{Branch, EngineError, ResultEngine, branches};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

impl Engine {
    /// Creates a venue branch with a unique name.
    pub async fn create_branch(&self, name: &str, address: Option<&str>) -> ResultEngine<Branch> {
        let name = normalize_required_text(name, "branch name")?;
        let address = normalize_optional_text(address);

        with_tx!(self, |db_tx| {
            let existing = branches::Entity::find()
                .filter(branches::Column::Name.eq(name.as_str()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(name));
            }

            let branch = Branch::new(name, address);
            branches::ActiveModel::from(&branch).insert(&db_tx).await?;
            Ok(branch)
        })
    }

    /// Fetches a branch by id.
    pub async fn branch(&self, branch_id: &str) -> ResultEngine<Branch> {
        let model = branches::Entity::find_by_id(branch_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("branch not exists".to_string()))?;
        Ok(Branch::from(model))
    }

    /// Lists all branches, ordered by name.
    pub async fn branches(&self) -> ResultEngine<Vec<Branch>> {
        let models = branches::Entity::find()
            .order_by_asc(branches::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Branch::from).collect())
    }
}
