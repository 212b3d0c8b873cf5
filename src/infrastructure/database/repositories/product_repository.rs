use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{DomainError, DomainResult, NewProduct, Product, ProductCategory, ProductRepository};
use crate::infrastructure::database::entities::product;
use crate::shared::Money;

pub struct SeaOrmProductRepository {
    db: DatabaseConnection,
}

impl SeaOrmProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_category_to_domain(category: product::ProductCategory) -> ProductCategory {
    match category {
        product::ProductCategory::Food => ProductCategory::Food,
        product::ProductCategory::Drinks => ProductCategory::Drinks,
        product::ProductCategory::Alcohol => ProductCategory::Alcohol,
        product::ProductCategory::Cigarettes => ProductCategory::Cigarettes,
    }
}

fn domain_category_to_entity(category: ProductCategory) -> product::ProductCategory {
    match category {
        ProductCategory::Food => product::ProductCategory::Food,
        ProductCategory::Drinks => product::ProductCategory::Drinks,
        ProductCategory::Alcohol => product::ProductCategory::Alcohol,
        ProductCategory::Cigarettes => product::ProductCategory::Cigarettes,
    }
}

fn product_model_to_domain(model: product::Model) -> Product {
    Product {
        id: model.id,
        name: model.name,
        price: Money::from_cents(model.price),
        amount: model.amount,
        description: model.description,
        image: model.image,
        category: entity_category_to_domain(model.category),
        seller_id: model.seller_id,
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn create(&self, p: NewProduct) -> DomainResult<Product> {
        let model = product::ActiveModel {
            name: Set(p.name),
            price: Set(p.price.cents()),
            amount: Set(p.amount),
            description: Set(p.description),
            image: Set(p.image),
            category: Set(domain_category_to_entity(p.category)),
            seller_id: Set(p.seller_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(product_model_to_domain(model))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Product>> {
        let model = product::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(product_model_to_domain))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = product::Entity::find()
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(product_model_to_domain).collect())
    }

    async fn find_by_seller(&self, seller_id: i32) -> DomainResult<Vec<Product>> {
        let models = product::Entity::find()
            .filter(product::Column::SellerId.eq(seller_id))
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(product_model_to_domain).collect())
    }

    async fn find_in_stock(&self) -> DomainResult<Vec<Product>> {
        let models = product::Entity::find()
            .filter(product::Column::Amount.gt(0))
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(product_model_to_domain).collect())
    }

    async fn update(&self, p: &Product) -> DomainResult<()> {
        let active = product::ActiveModel {
            id: Set(p.id),
            name: Set(p.name.clone()),
            price: Set(p.price.cents()),
            amount: Set(p.amount),
            description: Set(p.description.clone()),
            image: Set(p.image.clone()),
            category: Set(domain_category_to_entity(p.category)),
            seller_id: Set(p.seller_id),
        };

        match active.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(DomainError::not_found(format!(
                "Unable to find product with ID: {}.",
                p.id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        let result = product::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found(format!(
                "Unable to find product with ID: {}.",
                id
            )));
        }
        Ok(())
    }
}
