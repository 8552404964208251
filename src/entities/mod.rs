pub mod user;
pub mod product;
pub mod product_image;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod seller_application;
pub mod review;
pub mod wishlist_item;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Schema, Set,
    TransactionTrait,
};
use std::sync::Arc;

use crate::entities::{
    cart_item::Entity as CartItem,
    order::Entity as Order,
    order_item::Entity as OrderItem,
    product::Entity as Product,
    product_image::Entity as ProductImage,
    review::Entity as Review,
    seller_application::Entity as SellerApplication,
    user::Entity as User,
    wishlist_item::Entity as WishlistItem,
};

pub const SEED_ADMIN_EMAIL: &str = "admin@lavka.store";
pub const SEED_ADMIN_PASSWORD: &str = "Parol15";

pub async fn setup_schema(db: &DatabaseConnection) {
    let schema = Schema::new(db.get_database_backend());
    let create_user_table = schema.create_table_from_entity(User);
    let create_product_table = schema.create_table_from_entity(Product);
    let create_product_image_table = schema.create_table_from_entity(ProductImage);
    let create_cart_item_table = schema.create_table_from_entity(CartItem);
    let create_order_table = schema.create_table_from_entity(Order);
    let create_order_item_table = schema.create_table_from_entity(OrderItem);
    let create_seller_application_table = schema.create_table_from_entity(SellerApplication);
    let create_review_table = schema.create_table_from_entity(Review);
    let create_wishlist_item_table = schema.create_table_from_entity(WishlistItem);

    db.execute(db.get_database_backend().build(&create_user_table))
        .await
        .expect("Failed to create users schema");
    db.execute(db.get_database_backend().build(&create_product_table))
        .await
        .expect("Failed to create products schema");
    db.execute(db.get_database_backend().build(&create_product_image_table))
        .await
        .expect("Failed to create product_images schema");
    db.execute(db.get_database_backend().build(&create_cart_item_table))
        .await
        .expect("Failed to create cart_items schema");
    db.execute(db.get_database_backend().build(&create_order_table))
        .await
        .expect("Failed to create orders schema");
    db.execute(db.get_database_backend().build(&create_order_item_table))
        .await
        .expect("Failed to create order_items schema");
    db.execute(
        db.get_database_backend()
            .build(&create_seller_application_table),
    )
    .await
    .expect("Failed to create seller_applications schema");
    db.execute(db.get_database_backend().build(&create_review_table))
        .await
        .expect("Failed to create reviews schema");
    db.execute(db.get_database_backend().build(&create_wishlist_item_table))
        .await
        .expect("Failed to create wishlist_items schema");
}

//Seeds the admin account on first start. Re-running against an existing
//database is a no-op.
pub async fn primary_setup(db: Arc<DatabaseConnection>) {
    let existing = User::find()
        .filter(user::Column::Email.eq(SEED_ADMIN_EMAIL))
        .one(&*db)
        .await
        .expect("Failed to look up seed admin");
    if existing.is_some() {
        return;
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(SEED_ADMIN_PASSWORD.as_bytes(), &salt)
        .expect("Failed to hash password")
        .to_string();

    let new_admin = user::ActiveModel {
        email: Set(SEED_ADMIN_EMAIL.to_owned()),
        name: Set("Admin".to_owned()),
        password: Set(password_hash),
        role: Set(user::Role::Admin),
        phone: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match db.begin().await {
        Ok(txn) => match user::Entity::insert(new_admin).exec(&txn).await {
            Ok(_) => {
                if txn.commit().await.is_err() {
                    panic!("Failed to run primary setup, but function requested.");
                }
            }
            Err(_) => {
                let _ = txn.rollback().await;
                panic!("Failed to run primary setup, but function requested.");
            }
        },
        Err(_) => {
            panic!("Failed to run primary setup, but function requested.");
        }
    }
}
