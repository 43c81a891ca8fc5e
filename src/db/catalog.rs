use serde::Deserialize;
use std::path::Path;

use crate::{
    error::AppResult,
    models::{Catalog, Product, ProductId, User, UserId},
};

/// Row of the users CSV
#[derive(Debug, Deserialize)]
struct UserRecord {
    #[serde(rename = "User_ID")]
    user_id: String,
    #[serde(rename = "Product_Category_Preference")]
    category_preference: String,
    #[serde(rename = "Interests", default)]
    interests: String,
}

/// Row of the products CSV
#[derive(Debug, Deserialize)]
struct ProductRecord {
    product_id: u64,
    title: String,
    category: String,
    #[serde(default)]
    tags: String,
    popularity_score: f64,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User::new(
            UserId(record.user_id),
            record.category_preference,
            &record.interests,
        )
    }
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Product::new(
            ProductId(record.product_id),
            record.title,
            record.category,
            record.tags,
            record.popularity_score,
        )
    }
}

/// Reads users from any CSV source with `User_ID`,
/// `Product_Category_Preference` and `Interests` columns
pub fn read_users<R: std::io::Read>(reader: R) -> AppResult<Vec<User>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut users = Vec::new();
    for record in reader.deserialize::<UserRecord>() {
        users.push(record?.into());
    }
    Ok(users)
}

/// Reads products from any CSV source with `product_id`, `title`,
/// `category`, `tags` and `popularity_score` columns
pub fn read_products<R: std::io::Read>(reader: R) -> AppResult<Vec<Product>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut products = Vec::new();
    for record in reader.deserialize::<ProductRecord>() {
        products.push(record?.into());
    }
    Ok(products)
}

/// Loads the catalog from the users and products CSV files
pub fn load_catalog(users_path: &Path, products_path: &Path) -> AppResult<Catalog> {
    let users = read_users(std::fs::File::open(users_path).map_err(csv::Error::from)?)?;
    let products = read_products(std::fs::File::open(products_path).map_err(csv::Error::from)?)?;

    tracing::info!(
        users = users.len(),
        products = products.len(),
        users_path = %users_path.display(),
        products_path = %products_path.display(),
        "Catalog loaded"
    );

    Ok(Catalog::new(users, products))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_read_users() {
        let csv = "User_ID,Product_Category_Preference,Interests\n\
                   U1,Electronics,\"Gaming,Music\"\n\
                   U2,Books,\n";
        let users = read_users(csv.as_bytes()).unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].user_id, UserId::new("U1"));
        assert_eq!(users[0].interests.len(), 2);
        assert!(users[1].interests.is_empty());
    }

    #[test]
    fn test_read_products() {
        let csv = "product_id,title,category,tags,popularity_score\n\
                   1,Headphones,Electronics,\"audio, wireless\",90\n\
                   2,Novel,Books,fiction,72.5\n";
        let products = read_products(csv.as_bytes()).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].product_id, ProductId(1));
        assert_eq!(products[0].content_features, "electronics audio wireless");
        assert_eq!(products[1].popularity_score, 72.5);
    }

    #[test]
    fn test_read_products_rejects_bad_score() {
        let csv = "product_id,title,category,tags,popularity_score\n1,X,Books,a,high\n";
        assert!(matches!(
            read_products(csv.as_bytes()),
            Err(AppError::Catalog(_))
        ));
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_catalog(&dir.path().join("users.csv"), &dir.path().join("products.csv"));
        assert!(result.is_err());
    }
}
