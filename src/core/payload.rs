use crate::domain::document::PolicyDocument;
use crate::domain::model::RatingRequest;
use chrono::{Duration, NaiveDate};
use serde_json::{json, Map, Value};

pub const PRODUCT_CODE: &str = "X_CO_US_USCGLPP8";
pub const PRODUCT_VERSION: &str = "20240801_V01";
const ORG_CODE: &str = "10001";
const AGENT_CODE: &str = "PTY10000039468001";
const CURRENCY: &str = "USD";

const POLICY_TERM_DAYS: i64 = 365;
/// 尚未向呼叫端收集成立日期，先固定為兩年前
const BUSINESS_AGE_DAYS: i64 = 730;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 由「今天」推導出的保單日期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyDates {
    pub proposal_date: NaiveDate,
    pub effective_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub date_started: NaiveDate,
    pub date_of_birth: NaiveDate,
}

impl PolicyDates {
    pub fn from_today(today: NaiveDate) -> Self {
        let placeholder = today - Duration::days(BUSINESS_AGE_DAYS);
        Self {
            proposal_date: today,
            effective_date: today,
            expiry_date: today + Duration::days(POLICY_TERM_DAYS),
            date_started: placeholder,
            date_of_birth: placeholder,
        }
    }
}

fn fmt_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 依請求與日期組出完整的 createOrSave 文件
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadBuilder;

impl PayloadBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, request: &RatingRequest, today: NaiveDate) -> PolicyDocument {
        let dates = PolicyDates::from_today(today);

        let mut fields = Map::new();
        for (key, value) in [
            ("ProductCode", json!(PRODUCT_CODE)),
            ("ProductVersion", json!(PRODUCT_VERSION)),
            ("OrgCode", json!(ORG_CODE)),
            ("AgentCode", json!(AGENT_CODE)),
            ("PremiumCurrencyCode", json!(CURRENCY)),
            ("BookCurrencyCode", json!(CURRENCY)),
            ("PremiumBookExchangeRate", json!(1)),
            ("LocalCurrencyCode", json!(CURRENCY)),
            ("PremiumLocalExchangeRate", json!(1)),
            ("ProposalDate", json!(fmt_date(dates.proposal_date))),
            ("EffectiveDate", json!(fmt_date(dates.effective_date))),
            ("ExpiryDate", json!(fmt_date(dates.expiry_date))),
            ("PolicyCustomerList", json!([customer_section(request, &dates)])),
            ("PolicyPaymentInfoList", json!([payment_section()])),
            ("PolicyLobList", json!([lob_section(request, &dates)])),
        ] {
            fields.insert(key.to_string(), value);
        }

        PolicyDocument::new(fields)
    }
}

fn customer_section(request: &RatingRequest, dates: &PolicyDates) -> Value {
    json!({
        "CustomerName": request.customer_name(),
        "CustomerNo": request.customer_no(),
        "DateOfBirth": fmt_date(dates.date_of_birth),
        "IdNo": request.id_no(),
        "IdType": "4",
        "IsOrgParty": "N",
        "PolicyStatus": 2,
        "PostCode": request.post_code(),
        "CustomerType": "OrgCustomer",
        "State": request.state(),
        "IsPolicyHolder": "Y"
    })
}

fn payment_section() -> Value {
    json!({
        "PayModeCode": 100,
        "IsInstallment": "N",
        "InstallmentType": "10",
        "BillingType": "1"
    })
}

/// 風險問卷：全部預設為 "No"
const RISK_QUESTIONS: &[&str] = &[
    "XMedicalFacilitiesOrProfessionals",
    "XExposureToRadioactiveMaterials",
    "XOperationsInvolvingHazardousMaterial",
    "XOperationsSoldAcquiredDiscontinued5Years",
    "XMachineryEquipmentLoanedOrRented",
    "XWatercraftDocksFloatsOwnedHiredLeased",
    "XParkingFacilitiesOwnedRented",
    "XFeeChargedForParking",
    "XRecreationFacilitiesProvided",
    "XSwimmingPoolOnPremises",
    "XSportingSocialEventsSponsored",
    "XStructuralAlterationsContemplated",
    "XDemolitionExposureContemplated",
    "XActiveInJointVentures",
    "XLeaseEmployeesToFromOtherEmployers",
    "XLaborInterchangeWithOtherBusinesses",
    "XDayCareFacilitiesOperatedControlled",
    "XCrimesOccurredOnPremisesLast3Years",
    "XWrittenSafetySecurityPolicyInEffect",
    "XPromotionalLiteratureSafetySecurity",
    "XLossHistorySumaryHeader",
];

fn lob_section(request: &RatingRequest, dates: &PolicyDates) -> Value {
    let aggregate = request.general_aggregate_limit.as_str();

    let mut lob = json!({
        "XCGLIncluded": "Yes",
        "XCFIncluded": "Yes",
        "XEachOccurrenceLimit": request.each_occurrence_limit.as_str(),
        "XGeneralAggregateLimit": aggregate,
        "XPersonalAdvertisingInjuryLimit": "1000000",
        "XDamageToRentedPremisesLimit": "100000",
        "XMedicalExpenseLimit": "5000",
        "XProdsCompldOpsAggregateLimit": aggregate,
        "XBIDeductibles": "1,000 Per Occurrence",
        "XPDDeductibles": "1,000 Per Occurrence",
        "XLossHistoryYears": 3,

        "XCalculatedTotalPremium": 0,
        "XPremium": 0,
        "XPolicyTermPremium": 0,
        "XFinalPremium": 0,

        "XSIC": "5461",
        "XNAICSCode": request.naics_code,
        "XNAICSDefinition": request.naics_definition,
        "XLegalStructure": request.legal_structure.as_str(),
        "XLLCNumOfMembersManagers": 2,
        "XBusinessType": request.business_type.as_str(),
        "XDateStarted": fmt_date(dates.date_started),
        "XPrimaryOperations": "",
        "XRetailPct": 100,

        "PolicyRiskList": [location_section(request)],

        "ProductCode": PRODUCT_CODE,
        "ProductElementCode": PRODUCT_CODE
    });

    if let Some(fields) = lob.as_object_mut() {
        for question in RISK_QUESTIONS {
            fields.insert((*question).to_string(), Value::from("No"));
        }
    }
    lob
}

fn location_section(request: &RatingRequest) -> Value {
    json!({
        "XUnitNumber": 1,
        "XAnyAreaLeasedToOthers": "No",
        "XProtectionClass": "5",
        "XGLPremium": 0,
        "XCFPremium": 0,
        "XCalculatedTotalPremium": 0,
        "XPremium": 0,
        "XPolicyTermPremium": 0,
        "XAddress1": request.address1(),
        "XCity": request.city(),
        "XAddress2": "",
        "XCounty": "",
        "XState": request.state(),
        "XZipCode": request.zip_code(),
        "XCityLimits": "Inside",
        "XLocInterest": "Owner",
        "XFullTimeEmpl": request.full_time_empl,
        "XPartTimeEmpl": request.part_time_empl,
        "PolicyRiskList": [gl_classification(), building_section(request)],
        "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATION"
    })
}

fn gl_classification() -> Value {
    json!({
        "XClassCode": "10100",
        "XClassDescription": "Bakeries",
        "PolicyCoverageList": [
            {
                "XInstallServiceDemonstrateProducts": "No",
                "XForeignProductsSoldDistributedUsed": "No",
                "XResearchDevelopmentNewProducts": "No",
                "XGuaranteesWarrantiesHoldHarmless": "No",
                "XProductsAircraftSpaceIndustry": "No",
                "XProductsRecalledDiscontinuedChanged": "No",
                "XProductsOthersSoldRepackaged": "No",
                "XProductsUnderLabelOfOthers": "No",
                "XVendorsCoverageRequired": "No",
                "XNamedInsuredSellToOtherInsureds": "No",
                "XProdsCompldOpsPremiumBasis": "Gross Sales",
                "XProdsCompldOpsCovExposure": 1_000_000,
                "XProdsCompldOpsRate": 0.12,
                "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONCLASSIFICATIONPRODSCOMPLDOPSCOVERAGE"
            },
            {
                "XPremOpsPremiumBasis": "Gross Sales",
                "XPremOpsExposure": 1_000_000,
                "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONCLASSIFICATIONPREMOPSCOVERAGE"
            }
        ],
        "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONGLCLASSIFICATION"
    })
}

fn building_section(request: &RatingRequest) -> Value {
    json!({
        "XUnitNumber": 1,
        "XDesignatedAsHistoricalLandmark": "No",
        "XBldgImpWiring": "No",
        "XBldgImpPlumbing": "No",
        "XBldgImpRoofing": "No",
        "XBldgImpHeating": "No",
        "XWindClass": "NA",
        "XSolidFuelHeater": "No",
        "XBurglarAlarmCentralStation": "No",
        "XBurglarAlarmLocalGong": "No",
        "XGuardsClockFreq": "Hourly",
        "XFireAlarmCentralStation": "No",
        "XFireAlarmLocalGong": "No",
        "XBldgDescription": "Commercial Building",
        "XOpenSides": 0,
        "XConstructionType": "FireResistive",
        "XNumberOfStories": 1,
        "XYearBuilt": 2010,
        "XTotalArea": 5000,
        "XBCEG": 2,
        "PolicyCoverageList": [
            building_coverage(request.building_limit),
            bpp_coverage(request.bpp_limit),
            business_income_coverage(),
            spoilage_coverage()
        ],
        "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONCFBUILDING"
    })
}

fn building_coverage(limit: u64) -> Value {
    json!({
        "XCoverageOnPolicyIndicator": 1,
        "XBldgCovCoins": "80",
        "XBldgCovValuation": "A",
        "XBldgCovCauseOfLoss": "Special",
        "XBldgCovInflationGuard": 5,
        "XBldgCovDeductible": 500,
        "XBldgCovLimit": limit,
        "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONCFBUILDINGBUILDINGCOVERAGE"
    })
}

fn bpp_coverage(limit: u64) -> Value {
    json!({
        "XCoverageOnPolicyIndicator": 1,
        "XPersonalProperty": "Yes",
        "XPropertyOfOthers": "Yes",
        "XStock": "No",
        "XFixturesFurnitures": "No",
        "XMachineryEquipment": "No",
        "XBPPCovCoins": "80",
        "XBPPCovValuation": "A",
        "XBPPCovCauseOfLoss": "Special",
        "XBPPCovInflationGuard": 5,
        "XBPPCovDeductible": 500,
        "XBPPCovLimit": limit,
        "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONCFBUILDINGBPPCOVERAGE"
    })
}

fn business_income_coverage() -> Value {
    json!({
        "XCoverageOnPolicyIndicator": 1,
        "XBICCoverage": "BusinessIncomeWithExtraExpense",
        "XBICCovCoins": "80",
        "XBICCovCauseOfLoss": "Special",
        "XWaitingPeriodDays": 3,
        "XBICOrdinaryPayrollExcluded": "No",
        "XBICOrdinaryPayrollLimitation": "90Days",
        "XBICExtendedPeriodOfIndemnity": "No",
        "XBICMonthlyPeriodOfIndemnity": "No",
        "XBICMaximumPeriodOfIndemnity": "No",
        "XBICPowerHeatDed": "No",
        "XBICEMediaRec": "No",
        "XBIEOrdOrLaw": "No",
        "XBICCivilAuth": "No",
        "XBICOffPremSrvInt": "No",
        "XBICDependProp": "No",
        "XBICCovLimit": 200_000,
        "XBICTypeOfBusiness": "NonManufacturing",
        "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONCFBUILDINGBIC"
    })
}

fn spoilage_coverage() -> Value {
    json!({
        "XCoverageOnPolicyIndicator": 0,
        "XSCDeductible": 500,
        "XSCRefrigMaintAgreement": "No",
        "XSCBreakdownOrContamination": "No",
        "XSCPowerOutage": "No",
        "XSCSellingPrice": "No",
        "ProductElementCode": "MASTERGENLIA01BASELAYERLOCATIONCFBUILDINGSPOILAGECOVERAGE"
    })
}
