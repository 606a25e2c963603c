//! FILENAME: core/tablix-engine/src/binder.rs
//! Binder - The contract with the visual that formats cell content.
//!
//! A binder turns opaque hierarchy items into cell content (text, style
//! classes, indent). It is called once when a cell is realized and once
//! when the cell is recycled. It never owns cells and cannot touch their
//! layout state.

use crate::cell::{CellBinding, CellPayload, CellRole, TablixCell};
use crate::navigator::HierarchyNavigator;

pub trait TablixBinder<N: HierarchyNavigator> {
    /// Called before the first cell of a full rendering session is bound.
    fn on_start_rendering_session(&mut self) {}

    /// Called after a rendering session finished or was aborted.
    fn on_end_rendering_session(&mut self) {}

    /// Tables without row groups get no row header region and no corner.
    fn has_row_groups(&self) -> bool {
        true
    }

    fn bind_row_header(&mut self, navigator: &N, item: &N::Item, cell: &mut CellBinding<'_>);
    fn bind_column_header(&mut self, navigator: &N, item: &N::Item, cell: &mut CellBinding<'_>);
    fn bind_body_cell(&mut self, navigator: &N, item: &N::Intersection, cell: &mut CellBinding<'_>);
    fn bind_corner_cell(&mut self, navigator: &N, item: &N::Corner, cell: &mut CellBinding<'_>);

    fn unbind_row_header(&mut self, _navigator: &N, _item: &N::Item, _cell: &mut CellBinding<'_>) {}
    fn unbind_column_header(&mut self, _navigator: &N, _item: &N::Item, _cell: &mut CellBinding<'_>) {}
    fn unbind_body_cell(&mut self, _navigator: &N, _item: &N::Intersection, _cell: &mut CellBinding<'_>) {}
    fn unbind_corner_cell(&mut self, _navigator: &N, _item: &N::Corner, _cell: &mut CellBinding<'_>) {}
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Routes a cell to the bind method matching its role.
pub(crate) fn bind_cell<N, B>(navigator: &N, binder: &mut B, cell: &mut TablixCell<N>)
where
    N: HierarchyNavigator,
    B: TablixBinder<N> + ?Sized,
{
    let TablixCell {
        payload,
        context,
        content,
        ..
    } = cell;
    let role = context.role;
    let mut binding = CellBinding::new(*context, content);
    match (role, payload.as_ref()) {
        (CellRole::RowHeader, Some(CellPayload::Header(item))) => {
            binder.bind_row_header(navigator, item, &mut binding)
        }
        (CellRole::ColumnHeader, Some(CellPayload::Header(item))) => {
            binder.bind_column_header(navigator, item, &mut binding)
        }
        (CellRole::Body, Some(CellPayload::Body(item))) => {
            binder.bind_body_cell(navigator, item, &mut binding)
        }
        (CellRole::Corner, Some(CellPayload::Corner(item))) => {
            binder.bind_corner_cell(navigator, item, &mut binding)
        }
        _ => {}
    }
}

/// Routes a cell to the unbind method matching its role.
pub(crate) fn unbind_cell<N, B>(navigator: &N, binder: &mut B, cell: &mut TablixCell<N>)
where
    N: HierarchyNavigator,
    B: TablixBinder<N> + ?Sized,
{
    let TablixCell {
        payload,
        context,
        content,
        ..
    } = cell;
    let role = context.role;
    let mut binding = CellBinding::new(*context, content);
    match (role, payload.as_ref()) {
        (CellRole::RowHeader, Some(CellPayload::Header(item))) => {
            binder.unbind_row_header(navigator, item, &mut binding)
        }
        (CellRole::ColumnHeader, Some(CellPayload::Header(item))) => {
            binder.unbind_column_header(navigator, item, &mut binding)
        }
        (CellRole::Body, Some(CellPayload::Body(item))) => {
            binder.unbind_body_cell(navigator, item, &mut binding)
        }
        (CellRole::Corner, Some(CellPayload::Corner(item))) => {
            binder.unbind_corner_cell(navigator, item, &mut binding)
        }
        _ => {}
    }
}
