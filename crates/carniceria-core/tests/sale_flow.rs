//! Counter scenarios from product card to printed receipt, without I/O.

use carniceria_core::receipt::{render_ticket, ReceiptSettings};
use carniceria_core::ticket::{CreateTicketRequest, Ticket, TicketLine};
use carniceria_core::{
    Cart, CoreError, Cut, Money, PaymentType, Product, Quantity, SaleUnit, Selection,
};
use chrono::Utc;

fn money(s: &str) -> Money {
    s.parse().unwrap()
}

fn q(s: &str) -> Quantity {
    s.parse().unwrap()
}

/// What the backend would answer for a create request.
fn ticket_from(request: &CreateTicketRequest, id: i64, cart: &Cart) -> Ticket {
    Ticket {
        id,
        total: request.total,
        payment_type: request.payment_type,
        printed: false,
        created_at: Utc::now(),
        updated_at: None,
        user: None,
        items: cart
            .items()
            .iter()
            .map(|item| TicketLine {
                id: None,
                product_id: item.product_id(),
                product_name: item.product_name().to_string(),
                cut_id: item.cut_id(),
                cut_name: item.cut_name().map(str::to_string),
                quantity: item.quantity().value(),
                unit_price: item.unit_price(),
                subtotal: item.subtotal(),
                unit: item.unit(),
            })
            .collect(),
    }
}

#[test]
fn bife_de_chorizo_end_to_end() {
    let bife = Product::new(1, "Bife de Chorizo").with_price_per_kg(money("12.50"));

    let mut cart = Cart::new();
    let line = cart
        .add_item(&bife, None, Some(SaleUnit::Kg), q("1.2"))
        .unwrap();
    assert_eq!(line.quantity(), q("1.2"));
    assert_eq!(line.unit_price(), money("12.50"));
    assert_eq!(line.subtotal(), money("15.00"));

    let request = CreateTicketRequest::from_cart(&cart, PaymentType::Cash).unwrap();
    assert_eq!(request.total, money("15.00"));
    assert_eq!(request.items.len(), cart.len());

    let ticket = ticket_from(&request, 1, &cart);
    cart.clear();
    assert!(cart.is_empty());

    let receipt = render_ticket(&ticket, &ReceiptSettings::default());
    assert!(receipt.contains("Ticket: #000001"));
    assert!(receipt.contains("Bife de Chorizo"));
    assert!(receipt.contains("$15.00"));
}

#[test]
fn card_selection_feeds_the_cart() {
    let vacuno = Product::new(5, "Vacuno")
        .with_price_per_kg(money("10.00"))
        .with_cut(Cut::new(1, "Milanesa").with_price_per_unit(money("2.75")));

    let mut selection = Selection::new(&vacuno).unwrap();
    selection.select_cut(&vacuno, Some(1)).unwrap();
    assert_eq!(selection.unit(), SaleUnit::Piece);

    let mut cart = Cart::new();
    cart.add_item(&vacuno, selection.cut_id(), Some(selection.unit()), q("4"))
        .unwrap();
    let err = cart
        .add_item(&vacuno, Some(1), Some(SaleUnit::Kg), q("1"))
        .unwrap_err();
    assert!(matches!(err, CoreError::UnitNotAvailable { .. }));

    let request = CreateTicketRequest::from_cart(&cart, PaymentType::Transfer).unwrap();
    assert_eq!(request.total, money("11.00"));
    assert_eq!(request.items[0].cut_id, Some(1));
    assert_eq!(request.items[0].unit, SaleUnit::Piece);
}

#[test]
fn empty_cart_cannot_be_finalized() {
    let cart = Cart::new();
    assert!(matches!(
        CreateTicketRequest::from_cart(&cart, PaymentType::Card),
        Err(CoreError::EmptyCart)
    ));
}
