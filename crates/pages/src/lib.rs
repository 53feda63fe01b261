//! Method pages.
//!
//! A [`Page`] ties one [`ApiClient`] to a result [`Surface`] and a
//! [`GraphingWidget`], and drives the submit cycle for any method:
//!
//! 1. extract the request from the [`Form`]
//! 2. post it, plus the follow-up call when the method has one
//! 3. render the response and update the graph
//!
//! Every failure is shown through [`Surface::show_error`] and returned to
//! the caller as a [`PageError`].

use std::path::Path;

use numera_client::{ApiClient, ApiError};
use numera_core::{Form, FormError, PageState};
use numera_plot::{FunctionPlot, GraphingWidget, PlotMethod, PlotUpdate, SvgError, Traces};
use numera_render::{RenderError, RenderMethod, Rendered, Surface, latex};
use thiserror::Error;

/// A method that can be submitted from a page.
pub trait PageMethod: RenderMethod + PlotMethod {}

impl<M: RenderMethod + PlotMethod> PageMethod for M {}

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub rendered: Rendered,
    pub plot: PlotUpdate,
    pub traces: Option<Traces>,
}

/// One method page.
#[derive(Debug)]
pub struct Page<S, W> {
    client: ApiClient,
    surface: S,
    widget: W,
    state: PageState,
    plot_visible: bool,
}

impl<S: Surface, W: GraphingWidget> Page<S, W> {
    pub fn new(client: ApiClient, surface: S, widget: W) -> Self {
        Self {
            client,
            surface,
            widget,
            state: PageState::Idle,
            plot_visible: true,
        }
    }

    /// Resolves the service credential.
    ///
    /// A failed fetch is logged by the client; the page still becomes ready.
    pub async fn load(&mut self) {
        if self.state != PageState::Idle {
            return;
        }
        self.enter(PageState::ConfigLoading);
        let loaded = self.client.authorizer().resolve().await.is_some();
        tracing::debug!(loaded, "page configuration resolved");
        self.enter(PageState::Ready);
    }

    /// Submits the form for method `M` and displays the outcome.
    ///
    /// A form that fails validation is reported without any request being
    /// sent. A page that was never loaded resolves its credential on the way.
    /// Any failure replaces the previous result and hides its graph.
    ///
    /// # Errors
    ///
    /// Returns the error that was shown on the surface.
    pub async fn submit<M: PageMethod>(&mut self, form: &Form) -> Result<Submission, PageError> {
        let request = match M::extract(form) {
            Ok(request) => request,
            Err(error) => {
                tracing::warn!(method = M::NAME, %error, "form rejected");
                self.surface.clear();
                self.surface.show_error(&error.to_string());
                self.update_plot(&PlotUpdate::Hide);
                return Err(error.into());
            }
        };

        self.enter(PageState::Submitting);
        tracing::info!(method = M::NAME, path = M::PATH, "submitting");
        let outcome = self.exchange::<M>(&request).await;
        self.surface.clear();

        match &outcome {
            Ok(submission) => {
                self.enter(PageState::RenderingSuccess);
                self.surface.show(&submission.rendered);
                self.update_plot(&submission.plot);
            }
            Err(error) => {
                self.enter(PageState::RenderingError);
                tracing::warn!(method = M::NAME, %error, "submission failed");
                self.surface.show_error(&error.to_string());
                self.update_plot(&PlotUpdate::Hide);
            }
        }

        self.enter(PageState::Ready);
        outcome
    }

    /// Draws the form's function within its axis bounds.
    ///
    /// No request is sent; the typeset function is shown on the surface.
    ///
    /// # Errors
    ///
    /// Returns the form error that was shown on the surface.
    pub fn plot_function(&mut self, form: &Form) -> Result<FunctionPlot, PageError> {
        self.surface.clear();
        let plot = match FunctionPlot::extract(form) {
            Ok(plot) => plot,
            Err(error) => {
                tracing::warn!(%error, "function rejected");
                self.surface.show_error(&error.to_string());
                self.update_plot(&PlotUpdate::Hide);
                return Err(error.into());
            }
        };

        let rendered = Rendered::new("Function")
            .with_latex(format!("f(x) = {}", latex::expression(&plot.expression)));
        self.surface.show(&rendered);
        self.update_plot(&PlotUpdate::Draw(plot.script()));
        Ok(plot)
    }

    async fn exchange<M: PageMethod>(&self, request: &M::Request) -> Result<Submission, PageError> {
        let body = self.client.call::<M>(request).await?;
        let response = numera_render::decode::<M>(body)?;
        let follow_up = self.client.follow_up::<M>(request).await.transpose()?;

        let rendered = numera_render::render_response::<M>(&response, follow_up.as_ref())?;

        Ok(Submission {
            rendered,
            plot: M::plot(request, &response),
            traces: M::traces(&response),
        })
    }

    fn update_plot(&mut self, plot: &PlotUpdate) {
        match plot {
            PlotUpdate::Draw(script) => {
                script.apply(&mut self.widget);
                self.plot_visible = true;
            }
            PlotUpdate::Hide => self.plot_visible = false,
        }
    }

    /// Exports the current graph to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SvgError::Unavailable`] while the graph is hidden, and any
    /// export or write error otherwise.
    pub fn export_svg(&mut self, path: &Path) -> Result<(), SvgError> {
        if !self.plot_visible {
            return Err(SvgError::Unavailable);
        }
        numera_plot::export_svg(&mut self.widget, path)
    }

    fn enter(&mut self, next: PageState) {
        if !self.state.can_enter(next) {
            tracing::warn!(from = %self.state, to = %next, "unexpected page transition");
        }
        self.state = next;
    }

    #[must_use]
    pub fn state(&self) -> PageState {
        self.state
    }

    #[must_use]
    pub fn plot_visible(&self) -> bool {
        self.plot_visible
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn widget(&self) -> &W {
        &self.widget
    }
}
