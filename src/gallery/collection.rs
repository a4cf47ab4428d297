//! Collection mutators. Each takes the current collection by reference and
//! returns a fresh one; the input is never modified.

use chrono::{DateTime, Utc};

use crate::photo::{NewPhoto, OwnerId, Photo, PhotoId};

/// Prepend a newly created photo. Returns the new collection and the id
/// assigned to the photo.
pub fn add_photo(
    photos: &[Photo],
    new: NewPhoto,
    owner: &OwnerId,
    now: DateTime<Utc>,
) -> (Vec<Photo>, PhotoId) {
    let id = PhotoId::generate();
    let photo = Photo {
        id: id.clone(),
        owner_id: owner.clone(),
        title: new.title,
        description: new.description,
        image_url: new.image_url,
        category: new.category,
        is_favorite: new.is_favorite,
        created_at: now,
        updated_at: now,
    };

    let mut next = Vec::with_capacity(photos.len() + 1);
    next.push(photo);
    next.extend_from_slice(photos);
    (next, id)
}

/// Flip `is_favorite` on the photo with `id`. Unknown ids are a no-op.
///
/// `updated_at` is left alone: favoriting is not a content change.
pub fn toggle_favorite(photos: &[Photo], id: &PhotoId) -> Vec<Photo> {
    photos
        .iter()
        .map(|photo| {
            let mut photo = photo.clone();
            if photo.id == *id {
                photo.is_favorite = !photo.is_favorite;
            }
            photo
        })
        .collect()
}

/// Remove the photo with `id`. Unknown ids are a no-op.
pub fn delete_photo(photos: &[Photo], id: &PhotoId) -> Vec<Photo> {
    photos.iter().filter(|photo| photo.id != *id).cloned().collect()
}

pub fn find<'a>(photos: &'a [Photo], id: &PhotoId) -> Option<&'a Photo> {
    photos.iter().find(|photo| photo.id == *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::Category;
    use crate::seed::demo_photos;

    fn owner() -> OwnerId {
        OwnerId::new("owner-1")
    }

    fn new_photo(title: &str) -> NewPhoto {
        NewPhoto {
            title: title.to_string(),
            description: None,
            image_url: "file:///tmp/rex.png".to_string(),
            category: Category::Uncategorized,
            is_favorite: false,
        }
    }

    #[test]
    fn test_add_prepends_with_owner_and_timestamps() {
        let photos = demo_photos(&owner(), Utc::now());
        let now = Utc::now();
        let (next, id) = add_photo(&photos, new_photo("Rex"), &OwnerId::new("someone"), now);

        assert_eq!(next.len(), 5);
        assert_eq!(next[0].id, id);
        assert_eq!(next[0].title, "Rex");
        assert_eq!(next[0].owner_id, OwnerId::new("someone"));
        assert_eq!(next[0].created_at, now);
        assert_eq!(next[0].updated_at, now);
        assert_eq!(&next[1..], &photos[..]);
        assert!(photos.iter().all(|p| p.id != id));
    }

    #[test]
    fn test_add_does_not_touch_input() {
        let photos = demo_photos(&owner(), Utc::now());
        let before = photos.clone();
        let _ = add_photo(&photos, new_photo("Rex"), &owner(), Utc::now());
        assert_eq!(photos, before);
    }

    #[test]
    fn test_add_then_delete_restores_original() {
        let photos = demo_photos(&owner(), Utc::now());
        let (added, id) = add_photo(&photos, new_photo("Rex"), &owner(), Utc::now());
        assert_eq!(delete_photo(&added, &id), photos);

        let empty: Vec<Photo> = Vec::new();
        let (added, id) = add_photo(&empty, new_photo("Rex"), &owner(), Utc::now());
        assert!(delete_photo(&added, &id).is_empty());
    }

    #[test]
    fn test_toggle_favorite_flips_only_target() {
        let photos = demo_photos(&owner(), Utc::now());
        let toggled = toggle_favorite(&photos, &PhotoId::new("2"));

        assert!(toggled[1].is_favorite);
        assert_eq!(toggled[1].updated_at, photos[1].updated_at);
        for idx in [0, 2, 3] {
            assert_eq!(toggled[idx], photos[idx]);
        }
    }

    #[test]
    fn test_toggle_favorite_is_self_inverse() {
        let photos = demo_photos(&owner(), Utc::now());
        for id in ["1", "2", "3", "4", "missing"] {
            let id = PhotoId::new(id);
            assert_eq!(toggle_favorite(&toggle_favorite(&photos, &id), &id), photos);
        }
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let photos = demo_photos(&owner(), Utc::now());
        let missing = PhotoId::new("missing");
        assert_eq!(toggle_favorite(&photos, &missing), photos);
        assert_eq!(delete_photo(&photos, &missing), photos);
    }

    #[test]
    fn test_delete_removes_and_keeps_order() {
        let photos = demo_photos(&owner(), Utc::now());
        let remaining = delete_photo(&photos, &PhotoId::new("2"));
        let ids: Vec<&str> = remaining.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["1", "3", "4"]);
    }

    #[test]
    fn test_find() {
        let photos = demo_photos(&owner(), Utc::now());
        assert_eq!(
            find(&photos, &PhotoId::new("3")).map(|p| p.title.as_str()),
            Some("Labrador Portrait")
        );
        assert!(find(&photos, &PhotoId::new("9")).is_none());
    }
}
