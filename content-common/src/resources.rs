//! Attribute types for each backend collection the site reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    deserialize_timestamp, Attributes, Categories, MediaRef, Resource, SortDirection,
};

/// Blog post
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub categories: Categories,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub published_at: Option<DateTime<Utc>>,
    /// Author-chosen display date, preferred over `publishedAt` when set.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "MediaRef::deserialize_optional")]
    pub cover: Option<MediaRef>,
}

impl Attributes for BlogPost {
    fn title(&self) -> &str {
        &self.title
    }

    fn teaser(&self) -> Option<&str> {
        self.excerpt.as_deref()
    }

    fn body(&self) -> Option<&str> {
        self.content.as_deref()
    }

    fn categories(&self) -> &[String] {
        self.categories.as_slice()
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date.or(self.published_at)
    }
}

impl Resource for BlogPost {
    const PATH: &'static str = "blogs";
    const DEFAULT_SORT: Option<(&'static str, SortDirection)> =
        Some(("publishedAt", SortDirection::Desc));
}

/// Portfolio project
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "tags")]
    pub categories: Categories,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default, deserialize_with = "MediaRef::deserialize_optional")]
    pub thumbnail: Option<MediaRef>,
}

impl Attributes for Project {
    fn title(&self) -> &str {
        &self.title
    }

    fn teaser(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn body(&self) -> Option<&str> {
        self.content.as_deref()
    }

    fn categories(&self) -> &[String] {
        self.categories.as_slice()
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date.or(self.published_at)
    }
}

impl Resource for Project {
    const PATH: &'static str = "projects";
    const DEFAULT_SORT: Option<(&'static str, SortDirection)> =
        Some(("date", SortDirection::Desc));
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub institution: String,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Attributes for Education {
    fn title(&self) -> &str {
        self.degree.as_deref().unwrap_or(&self.institution)
    }

    fn teaser(&self) -> Option<&str> {
        self.field_of_study.as_deref().or(Some(self.institution.as_str()))
    }

    fn body(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }
}

impl Resource for Education {
    const PATH: &'static str = "educations";
    const DEFAULT_SORT: Option<(&'static str, SortDirection)> =
        Some(("startDate", SortDirection::Desc));
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    #[serde(default, alias = "position")]
    pub role: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub start_date: Option<DateTime<Utc>>,
    /// `None` for the current position.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "skills")]
    pub technologies: Categories,
}

impl Attributes for Experience {
    fn title(&self) -> &str {
        self.role.as_deref().unwrap_or(&self.company)
    }

    fn teaser(&self) -> Option<&str> {
        Some(self.company.as_str())
    }

    fn body(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn categories(&self) -> &[String] {
        self.technologies.as_slice()
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }
}

impl Resource for Experience {
    const PATH: &'static str = "experiences";
    const DEFAULT_SORT: Option<(&'static str, SortDirection)> =
        Some(("startDate", SortDirection::Desc));
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub title: String,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default, alias = "journal")]
    pub venue: Option<String>,
    #[serde(default, rename = "abstract")]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "tags")]
    pub categories: Categories,
    #[serde(default, alias = "publicationDate", deserialize_with = "deserialize_timestamp")]
    pub published_date: Option<DateTime<Utc>>,
}

impl Attributes for Publication {
    fn title(&self) -> &str {
        &self.title
    }

    fn teaser(&self) -> Option<&str> {
        self.venue.as_deref()
    }

    fn body(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    fn categories(&self) -> &[String] {
        self.categories.as_slice()
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.published_date
    }
}

impl Resource for Publication {
    const PATH: &'static str = "publications";
    const DEFAULT_SORT: Option<(&'static str, SortDirection)> =
        Some(("publishedDate", SortDirection::Desc));
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub issue_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub credential_url: Option<String>,
    #[serde(default, deserialize_with = "MediaRef::deserialize_optional")]
    pub badge: Option<MediaRef>,
}

impl Attributes for Certification {
    fn title(&self) -> &str {
        &self.name
    }

    fn teaser(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.issue_date
    }
}

impl Resource for Certification {
    const PATH: &'static str = "certifications";
    const DEFAULT_SORT: Option<(&'static str, SortDirection)> =
        Some(("issueDate", SortDirection::Desc));
}

/// A skill shown on the CV page; its single category drives the grouping.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub level: Option<u8>,
}

impl Attributes for Skill {
    fn title(&self) -> &str {
        &self.name
    }

    fn categories(&self) -> &[String] {
        self.category.as_slice()
    }
}

impl Resource for Skill {
    const PATH: &'static str = "skills";
    const DEFAULT_SORT: Option<(&'static str, SortDirection)> =
        Some(("name", SortDirection::Asc));
}
