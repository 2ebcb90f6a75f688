//! Bundled catalog shown while the product table is empty or unreachable.

use std::str::FromStr;

use crate::domain::Product;

pub const CATEGORY_PRECIOUS_HERBS: &str = "Dược Liệu Quý";
pub const CATEGORY_GINSENG_AND_FUNGI: &str = "Sâm & Nấm";
pub const CATEGORY_WILD_FRUIT: &str = "Trái Cây Rừng";
pub const CATEGORY_WELLNESS: &str = "Hỗ Trợ Sức Khỏe";

/// Whether the product store falls back to [`default_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogFallback {
    #[default]
    Seed,
    Disabled,
}

impl CatalogFallback {
    pub fn catalog(&self) -> Option<Vec<Product>> {
        match self {
            CatalogFallback::Seed => Some(default_catalog()),
            CatalogFallback::Disabled => None,
        }
    }
}

impl FromStr for CatalogFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "seed" | "on" | "true" => Ok(CatalogFallback::Seed),
            "off" | "none" | "false" => Ok(CatalogFallback::Disabled),
            other => Err(format!("expected seed or off, got {other}")),
        }
    }
}

struct Seed {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    price: u64,
    image: &'static str,
    description: &'static str,
    benefits: [&'static str; 3],
    badges: &'static [&'static str],
    origin: &'static str,
    volume: &'static str,
    alcohol_content: &'static str,
    aging_time: &'static str,
}

impl From<&Seed> for Product {
    fn from(seed: &Seed) -> Self {
        let mut product = Product::new(seed.id, seed.name, seed.category, seed.price);
        product.image = seed.image.to_string();
        product.description = seed.description.to_string();
        product.benefits = seed.benefits.iter().map(|b| b.to_string()).collect();
        product.badges = seed.badges.iter().map(|b| b.to_string()).collect();
        product.origin = Some(seed.origin.to_string());
        product.volume = Some(seed.volume.to_string());
        product.alcohol_content = Some(seed.alcohol_content.to_string());
        product.aging_time = Some(seed.aging_time.to_string());
        product
    }
}

const SEEDS: [Seed; 6] = [
    Seed {
        id: "1",
        name: "Rượu Đinh Lăng Điêu Khắc",
        category: CATEGORY_PRECIOUS_HERBS,
        price: 1_500_000,
        image: "https://images.unsplash.com/photo-1514362545857-3bc16c4c7d1b?auto=format&fit=crop&q=80&w=800",
        description: "Rễ đinh lăng lâu năm được điêu khắc hình rồng phượng tinh xảo, ngâm cùng rượu nếp cái hoa vàng chuẩn vị.",
        benefits: ["Bồi bổ cơ thể", "Tăng cường trí nhớ", "Giảm đau xương khớp"],
        badges: &["Tuyệt Tác", "Bán Chạy"],
        origin: "Nam Định, Việt Nam",
        volume: "5 Lít",
        alcohol_content: "35%",
        aging_time: "18 tháng",
    },
    Seed {
        id: "2",
        name: "Rượu Ba Kích Tím Quảng Ninh",
        category: CATEGORY_WELLNESS,
        price: 450_000,
        image: "https://images.unsplash.com/photo-1582650625119-3a31f8fa2699?auto=format&fit=crop&q=80&w=800",
        description: "Ba kích tím xịn rừng Quảng Ninh, giúp tăng cường sinh lực và mạnh gân cốt.",
        benefits: ["Bổ thận tráng dương", "Hỗ trợ sinh lý", "Giảm nhức mỏi"],
        badges: &["Bán Chạy", "Ưu Đãi Có Hạn"],
        origin: "Tiên Yên, Quảng Ninh",
        volume: "2 Lít",
        alcohol_content: "38%",
        aging_time: "12 tháng",
    },
    Seed {
        id: "3",
        name: "Rượu Đông Trùng Hạ Thảo",
        category: CATEGORY_GINSENG_AND_FUNGI,
        price: 2_200_000,
        image: "https://images.unsplash.com/photo-1569529465841-dfecdab7503b?auto=format&fit=crop&q=80&w=800",
        description: "Sử dụng Đông trùng hạ thảo nuôi cấy chuẩn VietGAP, kết hợp rượu lọc độc tố tinh khiết.",
        benefits: ["Tăng cường hệ miễn dịch", "Chống lão hóa", "Bảo vệ phổi và thận"],
        badges: &["Thượng Hạng", "Mới"],
        origin: "Lâm Đồng, Việt Nam",
        volume: "1 Lít",
        alcohol_content: "32%",
        aging_time: "6 tháng",
    },
    Seed {
        id: "4",
        name: "Rượu Sâm Cau Đỏ Rừng",
        category: CATEGORY_WELLNESS,
        price: 380_000,
        image: "https://images.unsplash.com/photo-1510812431401-41d2bd2722f3?auto=format&fit=crop&q=80&w=800",
        description: "Sâm cau đỏ rừng tự nhiên, vị cay nồng đặc trưng, mang lại sức mạnh từ núi rừng.",
        benefits: ["Tăng cường bản lĩnh phái mạnh", "Giảm mệt mỏi", "Kích thích tiêu hóa"],
        badges: &["Nổi Bật"],
        origin: "Tây Bắc, Việt Nam",
        volume: "2 Lít",
        alcohol_content: "40%",
        aging_time: "12 tháng",
    },
    Seed {
        id: "5",
        name: "Rượu Sim Rừng Phú Quốc",
        category: CATEGORY_WILD_FRUIT,
        price: 250_000,
        image: "https://images.unsplash.com/photo-1528823331199-6996456428c3?auto=format&fit=crop&q=80&w=800",
        description: "Trái sim rừng chín mọng, lên men tự nhiên tạo nên hương vị ngọt ngào, êm dịu.",
        benefits: ["Tốt cho hệ tiêu hóa", "Giàu vitamin", "Dễ uống cho cả nam và nữ"],
        badges: &["Dễ Uống"],
        origin: "Phú Quốc, Việt Nam",
        volume: "750ml",
        alcohol_content: "15%",
        aging_time: "3 tháng",
    },
    Seed {
        id: "6",
        name: "Rượu Táo Mèo Yên Bái",
        category: CATEGORY_WILD_FRUIT,
        price: 180_000,
        image: "https://images.unsplash.com/photo-1547595628-c61a29f496f0?auto=format&fit=crop&q=80&w=800",
        description: "Táo mèo chọn lọc từ vùng núi Yên Bái, ngâm ủ kỹ lưỡng mang lại vị chua chát nhẹ nhàng.",
        benefits: ["Hỗ trợ hạ huyết áp", "Giúp ăn ngon ngủ sâu", "Giảm mỡ máu"],
        badges: &["Phổ Biến", "Ưu Đãi Có Hạn"],
        origin: "Mù Cang Chải, Yên Bái",
        volume: "2 Lít",
        alcohol_content: "29%",
        aging_time: "9 tháng",
    },
];

/// The six-product house catalog.
pub fn default_catalog() -> Vec<Product> {
    SEEDS.iter().map(Product::from).collect()
}
