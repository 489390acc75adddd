//! Checkout submission.
//!
//! ```text
//! Idle ──submit──▶ Submitting ──2xx──▶ Confirmed
//!   ▲                  │
//!   └──rejected/unreachable
//! ```
//!
//! A missing credential or an incomplete form fails before leaving `Idle`;
//! neither makes a network call. Only a confirmed order touches the cart.

use thiserror::Error;
use tienda_core::{CheckoutRequest, FormError, OrderTotals, ShippingForm, summarize};

use super::collaborators::{
    CartStore, CartStoreError, CredentialStore, GatewayError, Navigator, OrderGateway, View,
};
use crate::backend::OrderReceipt;
use crate::error::add_breadcrumb;

/// Shown when checkout is attempted without logging in.
pub const LOGIN_REQUIRED_NOTICE: &str = "Debes iniciar sesión para completar la compra";

/// Used when the backend rejects an order without a `msg`.
pub const REJECTED_FALLBACK: &str = "No se pudo procesar la orden";

/// Shown when the backend cannot be reached.
pub const UNREACHABLE_NOTICE: &str = "Error de conexión con el servidor.";

/// Where a submitter is in its lifecycle.
///
/// `submit` borrows the submitter mutably, so `Submitting` is only observed
/// again after a submission future was dropped mid-request. Across HTTP
/// requests the storefront relies on [`super::InFlightCheckouts`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    #[default]
    Idle,
    Submitting,
    Confirmed,
}

/// Reasons a checkout did not produce an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No bearer credential; the shopper was sent to the login view.
    #[error("not authenticated")]
    Unauthenticated,

    /// A required form field is blank.
    #[error("incomplete form: {0}")]
    Incomplete(#[from] FormError),

    /// The backend refused the order.
    #[error("order rejected ({status}): {}", message.as_deref().unwrap_or("(no message)"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// The request never completed.
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// The cart could not be read.
    #[error(transparent)]
    Cart(#[from] CartStoreError),

    /// A previous submission from this submitter has not finished.
    #[error("a checkout is already in progress")]
    AlreadySubmitting,

    /// This submitter already placed its order.
    #[error("order already placed")]
    AlreadyPlaced,
}

impl From<GatewayError> for CheckoutError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { status, message } => Self::Rejected { status, message },
            GatewayError::Unreachable(reason) => Self::Unreachable(reason),
        }
    }
}

impl CheckoutError {
    /// Message for the shopper.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::Unauthenticated => LOGIN_REQUIRED_NOTICE.to_string(),
            Self::Incomplete(FormError::MissingField(field)) => {
                format!("Completa el campo: {}", field.label())
            }
            Self::Rejected { message, .. } => {
                format!("Error: {}", message.as_deref().unwrap_or(REJECTED_FALLBACK))
            }
            Self::Unreachable(_) => UNREACHABLE_NOTICE.to_string(),
            Self::Cart(_) => "No pudimos leer tu carrito. Intenta nuevamente.".to_string(),
            Self::AlreadySubmitting => "Tu orden ya se está procesando.".to_string(),
            Self::AlreadyPlaced => "Tu orden ya fue creada.".to_string(),
        }
    }

    /// Whether the shopper can fix the problem and submit the same form again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Incomplete(_) | Self::Rejected { .. } | Self::Unreachable(_) | Self::Cart(_)
        )
    }
}

/// A placed order.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub receipt: OrderReceipt,
    /// Totals that were sent with the order.
    pub totals: OrderTotals,
}

/// Drives one checkout form through submission.
pub struct CheckoutSubmitter<'a, G> {
    gateway: &'a G,
    phase: CheckoutPhase,
}

impl<'a, G: OrderGateway> CheckoutSubmitter<'a, G> {
    /// Create an idle submitter.
    #[must_use]
    pub const fn new(gateway: &'a G) -> Self {
        Self {
            gateway,
            phase: CheckoutPhase::Idle,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Submit the form with the current cart.
    ///
    /// On success the cart is cleared and the navigator is sent to the
    /// confirmation view. On failure the cart and form are untouched and the
    /// submitter returns to `Idle`, except for a missing credential, which
    /// sends the navigator to the login view.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`]; [`CheckoutError::notice`] gives the text to show.
    pub async fn submit<S, C, N>(
        &mut self,
        form: &ShippingForm,
        credentials: &S,
        cart: &C,
        navigator: &mut N,
    ) -> Result<Confirmation, CheckoutError>
    where
        S: CredentialStore + Sync,
        C: CartStore + Sync,
        N: Navigator + Send,
    {
        match self.phase {
            CheckoutPhase::Idle => {}
            CheckoutPhase::Submitting => return Err(CheckoutError::AlreadySubmitting),
            CheckoutPhase::Confirmed => return Err(CheckoutError::AlreadyPlaced),
        }

        let Some(token) = credentials.bearer_token().await else {
            tracing::info!("Checkout attempted without credential");
            navigator.navigate(View::Login);
            return Err(CheckoutError::Unauthenticated);
        };

        form.validate()?;

        let items = cart.line_items().await?;
        let totals = summarize(&items).totals;
        let request = CheckoutRequest::assemble(form, &items, &totals);

        self.phase = CheckoutPhase::Submitting;
        let item_count = items.len().to_string();
        add_breadcrumb(
            "checkout",
            "Submitting order",
            Some(&[("items", item_count.as_str())]),
        );

        match self.gateway.place_order(&token, &request).await {
            Ok(receipt) => {
                if let Err(e) = cart.clear().await {
                    // The order exists; a stale cart is the lesser problem.
                    tracing::error!(error = %e, order_id = ?receipt.id, "Failed to clear cart after order");
                }
                self.phase = CheckoutPhase::Confirmed;
                navigator.navigate(View::Confirmation);
                tracing::info!(order_id = ?receipt.id, total = %totals.total, "Checkout confirmed");
                Ok(Confirmation { receipt, totals })
            }
            Err(err) => {
                self.phase = CheckoutPhase::Idle;
                match &err {
                    GatewayError::Rejected { status, message } => tracing::warn!(
                        status,
                        message = message.as_deref().unwrap_or(""),
                        "Checkout rejected"
                    ),
                    GatewayError::Unreachable(reason) => {
                        tracing::error!(reason = %reason, "Checkout could not reach backend");
                    }
                }
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use rust_decimal::Decimal;
    use tienda_core::{CartProduct, LineItem, OrderId, PaymentMethod, ProductId, RawPrice};

    use super::*;
    use crate::backend::BearerToken;

    struct FakeCredentials(Option<&'static str>);

    impl CredentialStore for FakeCredentials {
        async fn bearer_token(&self) -> Option<BearerToken> {
            self.0.map(BearerToken::new)
        }
    }

    #[derive(Default)]
    struct FakeCart {
        items: Mutex<Vec<LineItem>>,
        clears: AtomicUsize,
    }

    impl FakeCart {
        fn with(items: Vec<LineItem>) -> Self {
            Self {
                items: Mutex::new(items),
                clears: AtomicUsize::new(0),
            }
        }

        fn len(&self) -> usize {
            self.items.lock().unwrap().len()
        }
    }

    impl CartStore for FakeCart {
        async fn line_items(&self) -> Result<Vec<LineItem>, CartStoreError> {
            Ok(self.items.lock().unwrap().clone())
        }

        async fn clear(&self) -> Result<(), CartStoreError> {
            self.clears.fetch_add(1, Ordering::SeqCst);
            self.items.lock().unwrap().clear();
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingNavigator {
        visits: Vec<View>,
    }

    impl Navigator for CountingNavigator {
        fn navigate(&mut self, view: View) {
            self.visits.push(view);
        }
    }

    struct FakeGateway {
        response: Result<OrderReceipt, GatewayError>,
        calls: AtomicUsize,
        last_request: Mutex<Option<CheckoutRequest>>,
        last_token: Mutex<Option<String>>,
    }

    impl FakeGateway {
        fn answering(response: Result<OrderReceipt, GatewayError>) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
                last_token: Mutex::new(None),
            }
        }

        fn ok() -> Self {
            Self::answering(Ok(OrderReceipt {
                id: Some(OrderId::new(41)),
                status: Some("Pending".to_string()),
                ..OrderReceipt::default()
            }))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl OrderGateway for FakeGateway {
        async fn place_order(
            &self,
            token: &BearerToken,
            request: &CheckoutRequest,
        ) -> Result<OrderReceipt, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            *self.last_token.lock().unwrap() = Some(token.expose().to_string());
            self.response.clone()
        }
    }

    /// Gateway whose request never completes.
    struct StalledGateway;

    impl OrderGateway for StalledGateway {
        async fn place_order(
            &self,
            _token: &BearerToken,
            _request: &CheckoutRequest,
        ) -> Result<OrderReceipt, GatewayError> {
            std::future::pending().await
        }
    }

    fn form() -> ShippingForm {
        ShippingForm {
            name: "Camila Rojas".to_string(),
            address_line: "Av. Providencia 1234".to_string(),
            locality: "Santiago".to_string(),
            region: "Metropolitana".to_string(),
            country: "Chile".to_string(),
            postal_code: "7500000".to_string(),
            phone: "+56 9 1234 5678".to_string(),
            payment_method: PaymentMethod::Paypal,
        }
    }

    fn one_item_cart() -> FakeCart {
        FakeCart::with(vec![LineItem::new(
            CartProduct {
                id: Some(ProductId::new(7)),
                name: "Polera".to_string(),
                base_price: None,
                price: Some(RawPrice::from(1000)),
            },
            3,
        )])
    }

    #[tokio::test]
    async fn test_missing_credential_redirects_to_login_without_request() {
        let gateway = FakeGateway::ok();
        let cart = one_item_cart();
        let mut nav = CountingNavigator::default();
        let mut submitter = CheckoutSubmitter::new(&gateway);

        let err = submitter
            .submit(&form(), &FakeCredentials(None), &cart, &mut nav)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Unauthenticated));
        assert_eq!(err.notice(), LOGIN_REQUIRED_NOTICE);
        assert_eq!(gateway.calls(), 0);
        assert_eq!(nav.visits, vec![View::Login]);
        assert_eq!(cart.len(), 1);
        assert_eq!(submitter.phase(), CheckoutPhase::Idle);
    }

    #[tokio::test]
    async fn test_payload_totals_and_bearer_token() {
        let gateway = FakeGateway::ok();
        let cart = one_item_cart();
        let mut nav = CountingNavigator::default();
        let mut submitter = CheckoutSubmitter::new(&gateway);

        let confirmation = submitter
            .submit(&form(), &FakeCredentials(Some("jwt-123")), &cart, &mut nav)
            .await
            .unwrap();

        let request = gateway.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.subtotal, Decimal::new(3000, 0));
        assert_eq!(request.shipping, Decimal::new(3000, 0));
        assert_eq!(request.total_amount, Decimal::new(6000, 0));
        assert_eq!(request.payment_method, PaymentMethod::Paypal);
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].price, Decimal::new(1000, 0));
        assert_eq!(request.items[0].quantity, 3);
        assert_eq!(
            gateway.last_token.lock().unwrap().as_deref(),
            Some("jwt-123")
        );
        assert_eq!(confirmation.totals.total, Decimal::new(6000, 0));
        assert_eq!(confirmation.receipt.id, Some(OrderId::new(41)));
    }

    #[tokio::test]
    async fn test_success_clears_cart_and_navigates_once() {
        let gateway = FakeGateway::ok();
        let cart = one_item_cart();
        let mut nav = CountingNavigator::default();
        let mut submitter = CheckoutSubmitter::new(&gateway);

        submitter
            .submit(&form(), &FakeCredentials(Some("jwt")), &cart, &mut nav)
            .await
            .unwrap();

        assert_eq!(cart.clears.load(Ordering::SeqCst), 1);
        assert_eq!(cart.len(), 0);
        assert_eq!(nav.visits, vec![View::Confirmation]);
        assert_eq!(gateway.calls(), 1);
        assert_eq!(submitter.phase(), CheckoutPhase::Confirmed);
    }

    #[tokio::test]
    async fn test_confirmed_submitter_refuses_second_order() {
        let gateway = FakeGateway::ok();
        let cart = one_item_cart();
        let mut nav = CountingNavigator::default();
        let mut submitter = CheckoutSubmitter::new(&gateway);
        let credentials = FakeCredentials(Some("jwt"));

        submitter
            .submit(&form(), &credentials, &cart, &mut nav)
            .await
            .unwrap();
        let err = submitter
            .submit(&form(), &credentials, &cart, &mut nav)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::AlreadyPlaced));
        assert_eq!(gateway.calls(), 1);
        assert_eq!(nav.visits.len(), 1);
    }

    #[tokio::test]
    async fn test_rejection_surfaces_server_message() {
        let gateway = FakeGateway::answering(Err(GatewayError::Rejected {
            status: 400,
            message: Some("out of stock".to_string()),
        }));
        let cart = one_item_cart();
        let mut nav = CountingNavigator::default();
        let mut submitter = CheckoutSubmitter::new(&gateway);

        let err = submitter
            .submit(&form(), &FakeCredentials(Some("jwt")), &cart, &mut nav)
            .await
            .unwrap_err();

        assert_eq!(err.notice(), "Error: out of stock");
        assert!(err.is_retryable());
        assert_eq!(cart.clears.load(Ordering::SeqCst), 0);
        assert_eq!(cart.len(), 1);
        assert!(nav.visits.is_empty());
        assert_eq!(submitter.phase(), CheckoutPhase::Idle);
    }

    #[tokio::test]
    async fn test_rejection_without_message_uses_fallback() {
        let gateway = FakeGateway::answering(Err(GatewayError::Rejected {
            status: 500,
            message: None,
        }));
        let cart = one_item_cart();
        let mut nav = CountingNavigator::default();
        let mut submitter = CheckoutSubmitter::new(&gateway);

        let err = submitter
            .submit(&form(), &FakeCredentials(Some("jwt")), &cart, &mut nav)
            .await
            .unwrap_err();

        assert_eq!(err.notice(), format!("Error: {REJECTED_FALLBACK}"));
    }

    #[tokio::test]
    async fn test_transport_failure_returns_to_idle() {
        let gateway =
            FakeGateway::answering(Err(GatewayError::Unreachable("connection refused".to_string())));
        let cart = one_item_cart();
        let mut nav = CountingNavigator::default();
        let mut submitter = CheckoutSubmitter::new(&gateway);
        let credentials = FakeCredentials(Some("jwt"));

        let err = submitter
            .submit(&form(), &credentials, &cart, &mut nav)
            .await
            .unwrap_err();

        assert_eq!(err.notice(), UNREACHABLE_NOTICE);
        assert_eq!(submitter.phase(), CheckoutPhase::Idle);
        assert_eq!(cart.len(), 1);
        assert!(nav.visits.is_empty());

        // Manual retry is allowed after a failure.
        let err = submitter
            .submit(&form(), &credentials, &cart, &mut nav)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Unreachable(_)));
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_incomplete_form_is_rejected_before_request() {
        let gateway = FakeGateway::ok();
        let cart = one_item_cart();
        let mut nav = CountingNavigator::default();
        let mut submitter = CheckoutSubmitter::new(&gateway);
        let incomplete = ShippingForm {
            locality: String::new(),
            ..form()
        };

        let err = submitter
            .submit(&incomplete, &FakeCredentials(Some("jwt")), &cart, &mut nav)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Incomplete(_)));
        assert_eq!(err.notice(), "Completa el campo: Ciudad");
        assert_eq!(gateway.calls(), 0);
        assert!(nav.visits.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_submission_refuses_resubmit() {
        let gateway = StalledGateway;
        let cart = one_item_cart();
        let mut nav = CountingNavigator::default();
        let mut submitter = CheckoutSubmitter::new(&gateway);
        let credentials = FakeCredentials(Some("jwt"));

        let attempt = tokio::time::timeout(
            Duration::from_millis(20),
            submitter.submit(&form(), &credentials, &cart, &mut nav),
        )
        .await;
        assert!(attempt.is_err(), "request should still be pending");
        assert_eq!(submitter.phase(), CheckoutPhase::Submitting);

        let err = submitter
            .submit(&form(), &credentials, &cart, &mut nav)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::AlreadySubmitting));
        assert_eq!(cart.clears.load(Ordering::SeqCst), 0);
        assert_eq!(cart.len(), 1);
        assert!(nav.visits.is_empty());
    }
}
