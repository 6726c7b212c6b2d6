//! Fragments shared by several pages of the generic site.

mod footer;
mod navigation;

pub use footer::{FooterComponent, SocialPlatform};
pub use navigation::NavigationComponent;
