use std::fmt;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl ImageSize {
    pub const ALL: [ImageSize; 3] = [ImageSize::Small, ImageSize::Medium, ImageSize::Large];

    pub fn dimensions(self) -> &'static str {
        match self {
            ImageSize::Small => "256x256",
            ImageSize::Medium => "512x512",
            ImageSize::Large => "1024x1024",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ImageSize::Small => "small",
            ImageSize::Medium => "medium",
            ImageSize::Large => "large",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ImageSize> for async_openai::types::ImageSize {
    fn from(size: ImageSize) -> Self {
        match size {
            ImageSize::Small => async_openai::types::ImageSize::S256x256,
            ImageSize::Medium => async_openai::types::ImageSize::S512x512,
            ImageSize::Large => async_openai::types::ImageSize::S1024x1024,
        }
    }
}
