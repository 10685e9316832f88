//! Demo content loaded into empty collections at startup.
//!
//! Mirrors what the marketing site shipped with before any real content
//! existed, so a freshly started server renders every page.

use chrono::{DateTime, TimeZone, Utc};

use super::{BlogPost, ContactStatus, ContactSubmission, EmailSubscriber, GalleryImage, ResourceId};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .earliest()
        .unwrap_or_default()
}

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris.\n\nDuis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur. Excepteur sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit anim id est laborum.\n\nSed ut perspiciatis unde omnis iste natus error sit voluptatem accusantium doloremque laudantium, totam rem aperiam, eaque ipsa quae ab illo inventore veritatis et quasi architecto beatae vitae dicta sunt explicabo.";

/// One published and one draft post.
#[must_use]
pub fn blogs() -> Vec<BlogPost> {
    let first = at(2024, 1, 15, 10, 30);
    let second = at(2024, 1, 16, 14, 20);
    vec![
        BlogPost {
            id: ResourceId::from("1"),
            title: "Blog title heading will go here".to_string(),
            content: LOREM.to_string(),
            image_name: None,
            image_file: None,
            published: true,
            created_at: first,
            updated_at: first,
        },
        BlogPost {
            id: ResourceId::from("2"),
            title: "Another Blog Post".to_string(),
            content: "This is another blog post with different content. It demonstrates the blog management functionality.".to_string(),
            image_name: None,
            image_file: None,
            published: false,
            created_at: second,
            updated_at: second,
        },
    ]
}

/// One submission per status.
#[must_use]
pub fn contacts() -> Vec<ContactSubmission> {
    [
        (
            "1",
            "John Doe",
            "john.doe@example.com",
            "+1-555-0123",
            "Shipping Quote",
            "I need a quote for shipping my products from New York to Los Angeles.",
            ContactStatus::Pending,
            at(2024, 1, 15, 10, 30),
        ),
        (
            "2",
            "Jane Smith",
            "jane.smith@example.com",
            "+1-555-0456",
            "Logistics Services",
            "Looking for logistics services for our e-commerce business.",
            ContactStatus::Read,
            at(2024, 1, 16, 14, 20),
        ),
        (
            "3",
            "Bob Wilson",
            "bob.wilson@example.com",
            "+1-555-0789",
            "Urgent Delivery",
            "Need urgent delivery services for medical supplies.",
            ContactStatus::Replied,
            at(2024, 1, 17, 9, 15),
        ),
    ]
    .into_iter()
    .map(
        |(id, name, email, phone, subject, message, status, when)| ContactSubmission {
            id: ResourceId::from(id),
            name: name.to_string(),
            email: email.to_string(),
            phone: Some(phone.to_string()),
            subject: Some(subject.to_string()),
            message: message.to_string(),
            status,
            created_at: when,
            updated_at: when,
        },
    )
    .collect()
}

/// The slider images, same as the client-side fallback defaults.
#[must_use]
pub fn gallery() -> Vec<GalleryImage> {
    let stamps = [
        at(2024, 1, 15, 10, 30),
        at(2024, 1, 16, 14, 20),
        at(2024, 1, 17, 9, 15),
    ];
    GalleryImage::fallback_defaults()
        .into_iter()
        .zip(stamps)
        .map(|(image, when)| GalleryImage {
            created_at: when,
            updated_at: when,
            ..image
        })
        .collect()
}

/// Two active subscribers and one who opted out.
#[must_use]
pub fn subscribers() -> Vec<EmailSubscriber> {
    [
        ("1", "john.doe@example.com", Some(("John", "Doe")), true, at(2024, 1, 15, 0, 0)),
        ("2", "jane.smith@example.com", Some(("Jane", "Smith")), true, at(2024, 1, 16, 0, 0)),
        ("3", "bob.wilson@example.com", None, false, at(2024, 1, 17, 0, 0)),
    ]
    .into_iter()
    .map(|(id, email, names, is_active, when)| EmailSubscriber {
        id: ResourceId::from(id),
        email: email.to_string(),
        first_name: names.map(|(first, _)| first.to_string()),
        last_name: names.map(|(_, last)| last.to_string()),
        is_active,
        created_at: when,
        updated_at: when,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_sizes() {
        assert_eq!(blogs().len(), 2);
        assert_eq!(contacts().len(), 3);
        assert_eq!(gallery().len(), 3);
        assert_eq!(subscribers().len(), 3);
    }

    #[test]
    fn only_first_blog_is_published() {
        let published: Vec<bool> = blogs().iter().map(|b| b.published).collect();
        assert_eq!(published, vec![true, false]);
    }

    #[test]
    fn seed_timestamps_are_not_epoch() {
        for image in gallery() {
            assert!(image.created_at > DateTime::<Utc>::default());
        }
    }
}
