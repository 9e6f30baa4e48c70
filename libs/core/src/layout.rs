//! Structural groupings built out of factory elements.

use crate::adaptive::{
    Column, ColumnSet, ColumnWidth, Container, ContainerStyle, Element, Spacing,
};
use crate::error::{CardError, CardResult};

pub struct LayoutHelper;

impl LayoutHelper {
    pub fn create_container(
        items: Vec<Element>,
        style: Option<ContainerStyle>,
        spacing: Option<Spacing>,
        separator: bool,
    ) -> Container {
        let mut container = Container::new(items).separator(separator);
        container.style = style;
        container.spacing = spacing;
        container
    }

    /// Every member must be an [`Element::Column`].
    pub fn create_column_set(columns: Vec<Element>) -> CardResult<ColumnSet> {
        if let Some((index, other)) = columns
            .iter()
            .enumerate()
            .find(|(_, element)| element.as_column().is_none())
        {
            return Err(CardError::invalid(format!(
                "column set member {index} is a {}, expected Column",
                other.type_name()
            )));
        }
        Ok(ColumnSet {
            columns,
            style: None,
            spacing: None,
            separator: None,
            id: None,
        })
    }

    /// One column per group, all with weight 1.
    pub fn create_equal_columns(groups: Vec<Vec<Element>>) -> CardResult<ColumnSet> {
        if groups.is_empty() {
            return Err(CardError::invalid("equal columns need at least one group"));
        }
        let columns = groups
            .into_iter()
            .map(|items| Column::new(items).width(ColumnWidth::Weight(1)))
            .collect();
        Ok(ColumnSet::new(columns))
    }

    pub fn create_two_column_layout(
        left_content: Vec<Element>,
        right_content: Vec<Element>,
        left_width: Option<ColumnWidth>,
        right_width: Option<ColumnWidth>,
    ) -> ColumnSet {
        ColumnSet::new(vec![
            Column::new(left_content).width(left_width.unwrap_or(ColumnWidth::Weight(1))),
            Column::new(right_content).width(right_width.unwrap_or(ColumnWidth::Weight(1))),
        ])
    }

    /// Outer container holding exactly three sections: header, body and footer.
    pub fn create_header_body_footer_layout(
        header_items: Vec<Element>,
        body_items: Vec<Element>,
        footer_items: Vec<Element>,
        header_style: Option<ContainerStyle>,
        footer_style: Option<ContainerStyle>,
    ) -> Container {
        let header = Container::new(header_items)
            .style(header_style.unwrap_or(ContainerStyle::Emphasis))
            .bleed(true);
        let body = Container::new(body_items).spacing(Spacing::Medium);
        let footer = Container::new(footer_items)
            .style(footer_style.unwrap_or(ContainerStyle::Accent))
            .spacing(Spacing::Medium)
            .separator(true);
        Container::new(vec![header.into(), body.into(), footer.into()])
    }
}
