//! Demo photos loaded into a fresh session.

use chrono::{DateTime, Duration, Utc};

use crate::photo::{Category, OwnerId, Photo, PhotoId};

struct DemoPhoto {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    image_url: &'static str,
    category: Category,
    is_favorite: bool,
    days_ago: i64,
}

const DEMO_PHOTOS: [DemoPhoto; 4] = [
    DemoPhoto {
        id: "1",
        title: "Golden Retriever Puppy",
        description: "Adorable golden retriever puppy playing in the garden",
        image_url: "https://images.unsplash.com/photo-1552053831-71594a27632d?w=500&h=500&fit=crop",
        category: Category::Puppy,
        is_favorite: true,
        days_ago: 1,
    },
    DemoPhoto {
        id: "2",
        title: "Border Collie in Action",
        description: "Border collie catching a frisbee at the park",
        image_url: "https://images.unsplash.com/photo-1551717743-49959800b1f6?w=500&h=500&fit=crop",
        category: Category::Action,
        is_favorite: false,
        days_ago: 2,
    },
    DemoPhoto {
        id: "3",
        title: "Labrador Portrait",
        description: "Beautiful portrait of a chocolate labrador",
        image_url: "https://images.unsplash.com/photo-1518717758536-85ae29035b6d?w=500&h=500&fit=crop",
        category: Category::Portrait,
        is_favorite: true,
        days_ago: 3,
    },
    DemoPhoto {
        id: "4",
        title: "German Shepherd",
        description: "Majestic German Shepherd standing in the field",
        image_url: "https://images.unsplash.com/photo-1589941013453-ec89f33b5e95?w=500&h=500&fit=crop",
        category: Category::Adult,
        is_favorite: false,
        days_ago: 4,
    },
];

/// The four demo photos, newest first, owned by `owner`.
pub fn demo_photos(owner: &OwnerId, now: DateTime<Utc>) -> Vec<Photo> {
    DEMO_PHOTOS
        .iter()
        .map(|demo| {
            let at = now - Duration::days(demo.days_ago);
            Photo {
                id: PhotoId::new(demo.id),
                owner_id: owner.clone(),
                title: demo.title.to_string(),
                description: Some(demo.description.to_string()),
                image_url: demo.image_url.to_string(),
                category: demo.category,
                is_favorite: demo.is_favorite,
                created_at: at,
                updated_at: at,
            }
        })
        .collect()
}
