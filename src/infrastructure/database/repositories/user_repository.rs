use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{
    DomainError, DomainResult, NewUser, User, UserRepository, UserType, VerificationState,
};
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_type_to_domain(user_type: user::UserType) -> UserType {
    match user_type {
        user::UserType::Admin => UserType::Admin,
        user::UserType::Buyer => UserType::Buyer,
        user::UserType::Seller => UserType::Seller,
    }
}

fn domain_type_to_entity(user_type: UserType) -> user::UserType {
    match user_type {
        UserType::Admin => user::UserType::Admin,
        UserType::Buyer => user::UserType::Buyer,
        UserType::Seller => user::UserType::Seller,
    }
}

fn entity_state_to_domain(state: user::VerificationState) -> VerificationState {
    match state {
        user::VerificationState::Accepted => VerificationState::Accepted,
        user::VerificationState::Waiting => VerificationState::Waiting,
        user::VerificationState::Denied => VerificationState::Denied,
    }
}

fn domain_state_to_entity(state: VerificationState) -> user::VerificationState {
    match state {
        VerificationState::Accepted => user::VerificationState::Accepted,
        VerificationState::Waiting => user::VerificationState::Waiting,
        VerificationState::Denied => user::VerificationState::Denied,
    }
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        full_name: model.full_name,
        birth_date: model.birth_date,
        address: model.address,
        user_type: entity_type_to_domain(model.user_type),
        verification_state: entity_state_to_domain(model.verification_state),
        has_full_access: model.has_full_access,
        image: model.image,
        registration_time: model.registration_time,
    }
}

fn write_err(e: DbErr) -> DomainError {
    if e.to_string().contains("UNIQUE") {
        DomainError::validation("Username or email already exists")
    } else {
        e.into()
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, new_user: NewUser) -> DomainResult<User> {
        let model = user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            full_name: Set(new_user.full_name),
            birth_date: Set(new_user.birth_date),
            address: Set(new_user.address),
            user_type: Set(domain_type_to_entity(new_user.user_type)),
            verification_state: Set(domain_state_to_entity(new_user.verification_state)),
            has_full_access: Set(new_user.has_full_access),
            image: Set(new_user.image),
            registration_time: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err)?;

        Ok(user_model_to_domain(model))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_type(&self, user_type: UserType) -> DomainResult<Vec<User>> {
        let models = user::Entity::find()
            .filter(user::Column::UserType.eq(domain_type_to_entity(user_type)))
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(user_model_to_domain).collect())
    }

    async fn find_sellers_by_state(&self, state: VerificationState) -> DomainResult<Vec<User>> {
        let models = user::Entity::find()
            .filter(user::Column::UserType.eq(user::UserType::Seller))
            .filter(user::Column::VerificationState.eq(domain_state_to_entity(state)))
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(user_model_to_domain).collect())
    }

    async fn update(&self, u: &User) -> DomainResult<()> {
        let active = user::ActiveModel {
            id: Set(u.id),
            username: Set(u.username.clone()),
            email: Set(u.email.clone()),
            password_hash: Set(u.password_hash.clone()),
            full_name: Set(u.full_name.clone()),
            birth_date: Set(u.birth_date),
            address: Set(u.address.clone()),
            user_type: Set(domain_type_to_entity(u.user_type)),
            verification_state: Set(domain_state_to_entity(u.verification_state)),
            has_full_access: Set(u.has_full_access),
            image: Set(u.image.clone()),
            registration_time: Set(u.registration_time),
        };

        match active.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(DomainError::not_found(format!(
                "Unable to find user with ID: {}.",
                u.id
            ))),
            Err(e) => Err(write_err(e)),
        }
    }
}
