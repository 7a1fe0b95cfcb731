//! Sibling disambiguation.
//!
//! Decides which attributes separate an element from one of its siblings,
//! following the backend's [`Dialect`](uiinspect_protocols::Dialect) table.

use std::collections::BTreeMap;

use uiinspect_protocols::{AccessResult, Attribute, ElementAccess, SeedRule};

/// Attributes gathered for one selector level.
pub type AttributeSet = BTreeMap<Attribute, String>;

pub struct Disambiguator<'a, A: ElementAccess + ?Sized> {
    access: &'a A,
}

impl<'a, A: ElementAccess + ?Sized> Disambiguator<'a, A> {
    pub fn new(access: &'a A) -> Self {
        Self { access }
    }

    /// Initial attributes for `element` according to the backend's seed rule.
    pub fn seed(&self, element: &A::Element) -> AccessResult<AttributeSet> {
        let mut attributes = AttributeSet::new();
        match self.access.dialect().seed {
            SeedRule::FirstPresent(candidates) => {
                for attribute in candidates {
                    if let Some(value) = self.present(element, *attribute)? {
                        attributes.insert(*attribute, value);
                        break;
                    }
                }
            }
            SeedRule::AllPresent(candidates) => {
                for attribute in candidates {
                    if let Some(value) = self.present(element, *attribute)? {
                        attributes.insert(*attribute, value);
                    }
                }
            }
        }
        Ok(attributes)
    }

    /// Compare `target` with one `sibling` under the attributes gathered so far.
    ///
    /// Returns whether the sibling is told apart and the attribute set, grown by
    /// at most one attribute. A sibling reported as not distinct matches the
    /// target on the tag and on every discriminator the target has a value for.
    pub fn distinguish(
        &self,
        target: &A::Element,
        sibling: &A::Element,
        mut attributes: AttributeSet,
    ) -> AccessResult<(bool, AttributeSet)> {
        let dialect = self.access.dialect();
        if dialect.tag_precheck && self.access.role(target)? != self.access.role(sibling)? {
            return Ok((true, attributes));
        }

        if self.differs_on_any(sibling, &attributes)? {
            return Ok((true, attributes));
        }

        for attribute in dialect.discriminators {
            if attributes.contains_key(attribute) {
                continue;
            }
            let Some(value) = self.access.attribute(target, *attribute)? else {
                continue;
            };
            let other = self.access.attribute(sibling, *attribute)?;
            if other.as_deref() != Some(value.as_str()) {
                attributes.insert(*attribute, value);
                return Ok((true, attributes));
            }
        }

        Ok((false, attributes))
    }

    fn differs_on_any(&self, sibling: &A::Element, attributes: &AttributeSet) -> AccessResult<bool> {
        for (attribute, value) in attributes {
            let other = self.access.attribute(sibling, *attribute)?;
            if other.as_deref() != Some(value.as_str()) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn present(&self, element: &A::Element, attribute: Attribute) -> AccessResult<Option<String>> {
        Ok(self
            .access
            .attribute(element, attribute)?
            .filter(|value| !value.is_empty()))
    }
}

#[cfg(test)]
#[path = "disambiguator_tests.rs"]
mod tests;
