//! 商品カタログ
//!
//! 起動時にメモリ上へ生成する静的カタログと、候補のランダム抽出

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::Product;

/// 生成する商品数
pub const CATALOG_SIZE: usize = 60;

const CATEGORIES: &[(&str, &str, [&str; 5])] = &[
    ("Fashion", "Stylish", ["Jacket", "Sneakers", "Watch", "Handbag", "Sunglasses"]),
    ("Electronics", "Modern", ["Headphones", "Laptop", "Smart Speaker", "Camera", "Drone"]),
    ("Home Goods", "Minimalist", ["Vase", "Lamp", "Chair", "Coffee Maker", "Wall Art"]),
    ("Sports", "Pro", ["Yoga Mat", "Dumbbells", "Basketball", "Running Shoes", "Water Bottle"]),
    ("Books", "Bestselling", ["Novel", "Cookbook", "Sci-Fi Epic", "Biography", "History Book"]),
    ("Toys", "Fun", ["Building Blocks", "Action Figure", "Plush Toy", "Board Game", "RC Car"]),
];

/// 候補商品の供給元
pub trait CatalogSource {
    /// 重複なしで `count` 件をランダム順に返す
    fn sample(&self, count: usize) -> Vec<Product>;
}

/// メモリ上の商品カタログ
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// 任意の商品リストから作成
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// デモ用カタログ（60件）を生成
    pub fn generated() -> Self {
        let products = (0..CATALOG_SIZE)
            .map(|i| {
                let (category, prefix, nouns) = &CATEGORIES[i % CATEGORIES.len()];
                let id = format!("product-{}", i + 1);
                Product {
                    name: format!("{} {} #{}", prefix, nouns[i % nouns.len()], i + 1),
                    category: category.to_string(),
                    image_url: format!("https://picsum.photos/seed/{}/400/400", id),
                    id,
                }
            })
            .collect();

        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// 乱数生成器を指定して抽出（テストでの再現用）
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<Product> {
        let mut shuffled = self.products.clone();
        shuffled.shuffle(rng);
        shuffled.truncate(count);
        shuffled
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::generated()
    }
}

impl CatalogSource for Catalog {
    fn sample(&self, count: usize) -> Vec<Product> {
        self.sample_with(&mut rand::thread_rng(), count)
    }
}
