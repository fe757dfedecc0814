//! Element actions, reads and predicates

use serde_json::json;
use tracing::instrument;

use crate::controller::ActionController;
use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::protocol::traits::DriverClient;
use crate::protocol::types::{Dimension, ElementHandle, Point};
use crate::retry::RetrySpec;
use crate::waits::WaitCondition;

impl ActionController {
    /// Click the element once it is clickable
    #[instrument(skip(self), fields(key = %self.key()))]
    pub async fn click(&self, locator: &Locator) -> Result<()> {
        self.act(
            locator,
            WaitCondition::Clickable,
            self.retry_spec(),
            |driver, handle| async move { driver.click(&handle).await },
        )
        .await
    }

    /// Clear the field and type `text` into it once it is visible
    #[instrument(skip(self, text), fields(key = %self.key()))]
    pub async fn type_text(&self, locator: &Locator, text: &str) -> Result<()> {
        self.act(
            locator,
            WaitCondition::Visibility,
            self.retry_spec(),
            |driver, handle| async move {
                driver.clear(&handle).await?;
                driver.send_keys(&handle, text).await
            },
        )
        .await
    }

    /// Set one inline CSS property on a visible element
    pub async fn change_style(
        &self,
        locator: &Locator,
        property: &str,
        value: &str,
    ) -> Result<()> {
        self.act(
            locator,
            WaitCondition::Visibility,
            RetrySpec::none(),
            |driver, handle| async move {
                driver
                    .execute_script(
                        "arguments[0].style[arguments[1]] = arguments[2];",
                        vec![handle.to_wire_json(), json!(property), json!(value)],
                    )
                    .await?;
                Ok(())
            },
        )
        .await
    }

    /// Send an absolute file path to a file input
    pub async fn upload_file(&self, locator: &Locator, path: &std::path::Path) -> Result<()> {
        let keys = path.display().to_string();
        self.act(
            locator,
            WaitCondition::Presence,
            self.retry_spec(),
            |driver, handle| {
                let keys = keys.clone();
                async move { driver.send_keys(&handle, &keys).await }
            },
        )
        .await
    }

    /// Wait for the element to become visible and return its handle
    pub async fn find_element(&self, locator: &Locator) -> Result<ElementHandle> {
        let (_, handle) = self.resolve(locator, WaitCondition::Visibility).await?;
        Ok(handle)
    }

    /// Children of the resolved parent matching `child`
    pub async fn find_child_elements(
        &self,
        parent: &Locator,
        child: &Locator,
    ) -> Result<Vec<ElementHandle>> {
        let (session, handle) = self.resolve(parent, WaitCondition::Presence).await?;
        session.driver().find_child_elements(&handle, child).await
    }

    // Reads

    pub async fn text(&self, locator: &Locator) -> Result<String> {
        self.act(
            locator,
            WaitCondition::Presence,
            self.retry_spec(),
            |driver, handle| async move { driver.text(&handle).await },
        )
        .await
    }

    pub async fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        self.act(
            locator,
            WaitCondition::Presence,
            self.retry_spec(),
            |driver, handle| async move { driver.attribute(&handle, name).await },
        )
        .await
    }

    pub async fn tag_name(&self, locator: &Locator) -> Result<String> {
        self.act(
            locator,
            WaitCondition::Presence,
            self.retry_spec(),
            |driver, handle| async move { driver.tag_name(&handle).await },
        )
        .await
    }

    pub async fn location(&self, locator: &Locator) -> Result<Point> {
        self.act(
            locator,
            WaitCondition::Presence,
            self.retry_spec(),
            |driver, handle| async move { driver.location(&handle).await },
        )
        .await
    }

    pub async fn dimensions(&self, locator: &Locator) -> Result<Dimension> {
        self.act(
            locator,
            WaitCondition::Presence,
            self.retry_spec(),
            |driver, handle| async move { driver.size(&handle).await },
        )
        .await
    }

    // Predicates
    //
    // A predicate runs the wait and maps its timeout to `false`; any other
    // failure (no session, fatal protocol error) still propagates.

    pub async fn is_element_present(&self, locator: &Locator) -> Result<bool> {
        self.holds(locator, WaitCondition::Presence).await
    }

    pub async fn is_element_visible(&self, locator: &Locator) -> Result<bool> {
        self.holds(locator, WaitCondition::Visibility).await
    }

    pub async fn is_element_clickable(&self, locator: &Locator) -> Result<bool> {
        self.holds(locator, WaitCondition::Clickable).await
    }

    pub async fn is_element_not_clickable(&self, locator: &Locator) -> Result<bool> {
        Ok(!self.is_element_clickable(locator).await?)
    }

    /// A field is editable when it is enabled and carries no `readonly`
    /// attribute
    pub async fn is_field_editable(&self, locator: &Locator) -> Result<bool> {
        let (session, handle) = self.resolve(locator, WaitCondition::Presence).await?;
        let driver = session.driver();
        Ok(driver.is_enabled(&handle).await? && driver.attribute(&handle, "readonly").await?.is_none())
    }

    pub async fn is_field_not_editable(&self, locator: &Locator) -> Result<bool> {
        Ok(!self.is_field_editable(locator).await?)
    }

    /// Whether the current page source contains `text`
    pub async fn is_text_present(&self, text: &str) -> Result<bool> {
        let session = self.session()?;
        Ok(session.driver().page_source().await?.contains(text))
    }

    async fn holds(&self, locator: &Locator, condition: WaitCondition) -> Result<bool> {
        match self.resolve(locator, condition).await {
            Ok(_) => Ok(true),
            Err(Error::WaitTimeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // Dropdowns

    /// Select the option whose `value` attribute matches
    pub async fn select_by_value(&self, locator: &Locator, value: &str) -> Result<()> {
        self.toggle_option_by_value(locator, value, true).await
    }

    pub async fn deselect_by_value(&self, locator: &Locator, value: &str) -> Result<()> {
        self.toggle_option_by_value(locator, value, false).await
    }

    /// Select the option whose rendered text matches
    pub async fn select_by_visible_text(&self, locator: &Locator, text: &str) -> Result<()> {
        self.toggle_option_by_text(locator, text, true).await
    }

    pub async fn deselect_by_visible_text(&self, locator: &Locator, text: &str) -> Result<()> {
        self.toggle_option_by_text(locator, text, false).await
    }

    /// Text of the first selected option
    pub async fn first_selected_option_text(&self, locator: &Locator) -> Result<String> {
        let (session, select) = self.resolve(locator, WaitCondition::Presence).await?;
        let driver = session.driver();
        for option in Self::options_of(driver.as_ref(), &select).await? {
            if driver.is_selected(&option).await? {
                return driver.text(&option).await;
            }
        }
        Err(Error::element_not_found("no option selected"))
    }

    /// Text of every option, in document order. Pure read: nothing is
    /// clicked or mutated.
    pub async fn all_options_text(&self, locator: &Locator) -> Result<Vec<String>> {
        let (session, select) = self.resolve(locator, WaitCondition::Presence).await?;
        let driver = session.driver();
        let options = Self::options_of(driver.as_ref(), &select).await?;
        futures::future::try_join_all(options.iter().map(|option| driver.text(option))).await
    }

    async fn toggle_option_by_value(
        &self,
        locator: &Locator,
        value: &str,
        select: bool,
    ) -> Result<()> {
        self.act(
            locator,
            WaitCondition::Presence,
            self.retry_spec(),
            |driver, handle| async move {
                let option_locator = Locator::css(format!("option[value=\"{}\"]", value));
                let option = driver
                    .find_child_elements(&handle, &option_locator)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::element_not_found(option_locator.to_string()))?;
                Self::toggle(driver.as_ref(), &option, select).await
            },
        )
        .await
    }

    async fn toggle_option_by_text(
        &self,
        locator: &Locator,
        text: &str,
        select: bool,
    ) -> Result<()> {
        self.act(
            locator,
            WaitCondition::Presence,
            self.retry_spec(),
            |driver, handle| async move {
                for option in Self::options_of(driver.as_ref(), &handle).await? {
                    if driver.text(&option).await? == text {
                        return Self::toggle(driver.as_ref(), &option, select).await;
                    }
                }
                Err(Error::element_not_found(format!("option with text {:?}", text)))
            },
        )
        .await
    }

    async fn options_of(
        driver: &dyn DriverClient,
        select: &ElementHandle,
    ) -> Result<Vec<ElementHandle>> {
        driver
            .find_child_elements(select, &Locator::tag_name("option"))
            .await
    }

    /// Click only when the option is not already in the wanted state, so
    /// repeated selects do not toggle a multi-select off again
    async fn toggle(driver: &dyn DriverClient, option: &ElementHandle, select: bool) -> Result<()> {
        if driver.is_selected(option).await? != select {
            driver.click(option).await?;
        }
        Ok(())
    }

    // Tables

    /// Number of body rows in the resolved table
    pub async fn table_rows(&self, locator: &Locator) -> Result<usize> {
        self.act(
            locator,
            WaitCondition::Presence,
            self.retry_spec(),
            |driver, handle| async move {
                Ok(driver
                    .find_child_elements(&handle, &Locator::css("tbody tr"))
                    .await?
                    .len())
            },
        )
        .await
    }

    /// Number of cells in the first body row of the resolved table
    pub async fn table_columns(&self, locator: &Locator) -> Result<usize> {
        self.act(
            locator,
            WaitCondition::Presence,
            self.retry_spec(),
            |driver, handle| async move {
                Ok(driver
                    .find_child_elements(&handle, &Locator::jquery("tbody tr:nth-child(1) td"))
                    .await?
                    .len())
            },
        )
        .await
    }
}
