use serde::{Deserialize, Serialize};

/// A product line in the cart
///
/// This is also the persisted shape: the cart is stored as a JSON array of
/// these objects, `{id, title, image_url, price, quantity}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product id, stable across sessions
    pub id: String,
    pub title: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    /// Unit price
    pub price: f64,
    /// Always at least 1 while the item is in the cart
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// A product being added to the cart, before it has a quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: String,
    pub title: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    pub price: f64,
}

impl NewCartItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

impl From<NewCartItem> for CartItem {
    fn from(item: NewCartItem) -> Self {
        CartItem {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity: 1,
        }
    }
}
