//! Localized KPI report formatting for the performance action.

use mpbf_core::Language;
use mpbf_store::KpiSnapshot;

/// Render the KPI snapshot as a multi-line operator report.
pub fn kpi_report(snapshot: &KpiSnapshot, language: Language) -> String {
    match language {
        Language::Arabic => format!(
            "تقرير أداء المصنع:\n\
             - الطلبات النشطة: {}\n\
             - معدل الإنتاج: {:.1} كجم/ساعة\n\
             - مؤشر الجودة: {:.1}%\n\
             - نسبة الهدر: {:.1}%\n\
             - المكائن العاملة: {}\n\
             - مكائن تحت الصيانة: {}",
            snapshot.active_orders,
            snapshot.production_rate,
            snapshot.quality_score,
            snapshot.waste_percentage,
            snapshot.active_machines,
            snapshot.maintenance_machines,
        ),
        Language::English => format!(
            "Factory performance report:\n\
             - Active orders: {}\n\
             - Production rate: {:.1} kg/h\n\
             - Quality score: {:.1}%\n\
             - Waste: {:.1}%\n\
             - Machines running: {}\n\
             - Machines in maintenance: {}",
            snapshot.active_orders,
            snapshot.production_rate,
            snapshot.quality_score,
            snapshot.waste_percentage,
            snapshot.active_machines,
            snapshot.maintenance_machines,
        ),
    }
}
