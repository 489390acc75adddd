//! Checkout route handlers.
//!
//! The form posts back to `/checkout`. Submission is delegated to
//! [`CheckoutSubmitter`] with session-backed collaborators; the view the
//! submitter navigated to becomes a redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tienda_core::{PaymentMethod, ShippingField, ShippingForm, format_clp};
use tower_sessions::Session;
use tracing::instrument;

use crate::checkout::{
    CheckoutError, CheckoutSubmitter, Confirmation, RecordedNavigation, View,
};
use crate::error::Result;
use crate::middleware::{SessionCredentials, set_flash, take_flash};
use crate::models::{Flash, LastOrder, session_keys};
use crate::routes::cart::CartView;
use crate::services::SessionCart;
use crate::state::AppState;

/// Text input display data for templates.
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    pub input_type: &'static str,
}

/// Payment option display data for templates.
pub struct PaymentOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub flash: Option<Flash>,
    /// Error from the last submission attempt.
    pub notice: Option<String>,
    pub fields: Vec<FieldView>,
    pub payment_methods: Vec<PaymentOptionView>,
    pub summary: CartView,
}

impl CheckoutTemplate {
    fn new(form: &ShippingForm, summary: CartView) -> Self {
        let fields = ShippingField::ALL
            .into_iter()
            .map(|field| FieldView {
                name: field.form_name(),
                label: field.label(),
                value: form.value(field).to_string(),
                input_type: if field == ShippingField::Phone {
                    "tel"
                } else {
                    "text"
                },
            })
            .collect();

        let payment_methods = PaymentMethod::ALL
            .into_iter()
            .map(|method| PaymentOptionView {
                value: method.as_str(),
                label: method.label(),
                selected: method == form.payment_method,
            })
            .collect();

        Self {
            flash: None,
            notice: None,
            fields,
            payment_methods,
            summary,
        }
    }
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub order_id: Option<String>,
    pub status: Option<String>,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

impl From<&LastOrder> for ConfirmationTemplate {
    fn from(order: &LastOrder) -> Self {
        Self {
            order_id: order.order_id.map(|id| id.to_string()),
            status: order.status.clone(),
            subtotal: format_clp(order.subtotal),
            shipping: format_clp(order.shipping),
            total: format_clp(order.total),
        }
    }
}

/// Display the checkout form with the order summary.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<impl IntoResponse> {
    let items = SessionCart(&session).items().await?;

    let mut template = CheckoutTemplate::new(&ShippingForm::default(), CartView::from_items(&items));
    template.flash = take_flash(&session).await;
    Ok(template)
}

/// Submit the checkout form.
///
/// - Success: the cart is cleared and the shopper lands on the confirmation page
/// - No credential: redirect to login with a notice
/// - Anything else: the form is shown again, filled in, with the notice
#[instrument(skip(state, session, form), fields(payment_method = %form.payment_method))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ShippingForm>,
) -> Result<Response> {
    // A session that was never saved has no credential either; the submitter
    // handles it without a network call.
    let claim = session.id().map(|id| id.to_string());
    if let Some(key) = &claim
        && !state.in_flight().try_claim(key).await
    {
        tracing::info!("Duplicate checkout submission ignored");
        set_flash(&session, Flash::error(CheckoutError::AlreadySubmitting.notice())).await?;
        return Ok(Redirect::to(View::Checkout.path()).into_response());
    }

    let credentials = SessionCredentials(&session);
    let cart = SessionCart(&session);
    let mut navigation = RecordedNavigation::default();
    let mut submitter = CheckoutSubmitter::new(state.backend());

    let outcome = submitter
        .submit(&form, &credentials, &cart, &mut navigation)
        .await;

    // The cleared cart must be in the store before another submission can
    // claim the session.
    let persisted = persist_outcome(&session, &outcome).await;
    if let Some(key) = &claim {
        state.in_flight().release(key).await;
    }
    persisted?;

    match outcome {
        Ok(_) => {
            let target = navigation.target().unwrap_or(View::Confirmation);
            Ok(Redirect::to(target.path()).into_response())
        }
        Err(err) => {
            if let Some(view) = navigation.target() {
                set_flash(&session, Flash::error(err.notice())).await?;
                return Ok(Redirect::to(view.path()).into_response());
            }

            let items = cart.items().await?;
            let mut template = CheckoutTemplate::new(&form, CartView::from_items(&items));
            template.notice = Some(err.notice());

            let status = match err {
                CheckoutError::Unreachable(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            Ok((status, template).into_response())
        }
    }
}

/// Record the placed order and write the session to the store.
async fn persist_outcome(
    session: &Session,
    outcome: &std::result::Result<Confirmation, CheckoutError>,
) -> Result<()> {
    if let Ok(confirmation) = outcome {
        let last_order = LastOrder::new(&confirmation.receipt, &confirmation.totals);
        session.insert(session_keys::LAST_ORDER, last_order).await?;
    }
    session.save().await?;
    Ok(())
}

/// Display the confirmation for the last placed order.
#[instrument(skip(session))]
pub async fn confirmation(session: Session) -> Result<Response> {
    let last_order = session.get::<LastOrder>(session_keys::LAST_ORDER).await?;

    Ok(match last_order {
        Some(order) => ConfirmationTemplate::from(&order).into_response(),
        None => Redirect::to(View::Home.path()).into_response(),
    })
}
