use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tracing::debug;

use nutriplan_core::catalog::{Product, ProductCatalog};
use nutriplan_core::openfoodfacts::{ProductResponse, SearchResponse, product_from_data};

const BASE_URL: &str = "https://world.openfoodfacts.org/api/v2";
const PAGE_SIZE: &str = "20";

/// Build the HTTP client shared by both catalog providers.
pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(format!(
            "nutriplan-cli/{} (food tracker)",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(std::time::Duration::from_secs(10))
        .connect_timeout(std::time::Duration::from_secs(5))
        .build()
        .context("Failed to build HTTP client")
}

pub struct OpenFoodFactsClient {
    client: reqwest::Client,
    rt: Handle,
}

impl OpenFoodFactsClient {
    pub fn new(rt: Handle) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            rt,
        })
    }

    pub async fn search_async(&self, query: &str) -> Result<Vec<Product>> {
        let resp = self
            .client
            .get(format!("{BASE_URL}/search"))
            .query(&[
                ("search_terms", query),
                ("page_size", PAGE_SIZE),
                ("json", "true"),
            ])
            .send()
            .await
            .context("Failed to reach OpenFoodFacts API")?
            .error_for_status()
            .context("OpenFoodFacts search failed")?;

        let data: SearchResponse = resp
            .json()
            .await
            .context("Failed to parse OpenFoodFacts search response")?;

        let products: Vec<Product> = data
            .products
            .into_iter()
            .filter_map(product_from_data)
            .collect();
        debug!(query, count = products.len(), "OpenFoodFacts search");

        Ok(products)
    }

    pub async fn lookup_barcode_async(&self, barcode: &str) -> Result<Option<Product>> {
        let resp = self
            .client
            .get(format!("{BASE_URL}/product/{barcode}"))
            .send()
            .await
            .context("Failed to reach OpenFoodFacts API")?;

        // unknown barcodes come back as 404 with a status-0 body
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let data: ProductResponse = resp
            .error_for_status()
            .context("OpenFoodFacts barcode lookup failed")?
            .json()
            .await
            .context("Failed to parse OpenFoodFacts barcode response")?;

        if data.status != 1 {
            return Ok(None);
        }

        Ok(data.product.and_then(product_from_data))
    }
}

impl ProductCatalog for OpenFoodFactsClient {
    fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        self.rt.block_on(self.search_async(query))
    }

    fn product_by_barcode(&self, barcode: &str) -> Result<Option<Product>> {
        self.rt.block_on(self.lookup_barcode_async(barcode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Integration tests (hit real OpenFoodFacts API) ---

    #[tokio::test]
    #[ignore = "hits OpenFoodFacts API"]
    async fn test_lookup_barcode_known_product() {
        let client = OpenFoodFactsClient::new(Handle::current()).unwrap();
        let result = client.lookup_barcode_async("3017620422003").await.unwrap();
        let product = result.expect("Nutella should exist in OpenFoodFacts");
        assert!(product.name.to_lowercase().contains("nutella"));
        assert!(product.nutrition.calories_per_100g.unwrap_or(0.0) > 0.0);
        assert_eq!(product.code, "3017620422003");
    }

    #[tokio::test]
    #[ignore = "hits OpenFoodFacts API"]
    async fn test_lookup_barcode_not_found() {
        let client = OpenFoodFactsClient::new(Handle::current()).unwrap();
        let result = client.lookup_barcode_async("0000000000000").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    #[ignore = "hits OpenFoodFacts API"]
    async fn test_search_returns_results() {
        let client = OpenFoodFactsClient::new(Handle::current()).unwrap();
        let results = client.search_async("nutella").await.unwrap();
        assert!(!results.is_empty());
        for product in &results {
            assert!(!product.name.is_empty());
        }
    }
}
