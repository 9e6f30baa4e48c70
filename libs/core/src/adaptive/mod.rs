//! Typed Adaptive Card document model.

pub mod actions;
pub mod card;
pub mod elements;
pub mod style;

pub use actions::{Action, OpenUrlAction, SubmitAction};
pub use card::{
    ADAPTIVE_CARD_SCHEMA, AdaptiveCard, CardSink, DEFAULT_CARD_VERSION, SUPPORTED_VERSIONS,
    is_supported_version,
};
pub use elements::{
    Choice, ChoiceSet, Column, ColumnSet, Container, DateInput, Element, Fact, FactSet, Image,
    TextBlock, TextInput,
};
pub use style::{
    ActionStyle, ChoiceInputStyle, Color, ColumnWidth, ContainerStyle, FontSize, FontType,
    FontWeight, ImageSize, ImageStyle, Spacing, VerticalAlignment,
};
